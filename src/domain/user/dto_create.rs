/// Sign-up input after validation; the password is already hashed
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
}
