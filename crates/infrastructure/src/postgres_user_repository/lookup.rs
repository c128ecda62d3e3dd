use super::*;

impl PostgresUserRepository {
    pub(super) async fn find_credentials_by_email_impl(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r#"
            SELECT id, email, name, role_id, created_at, password_hash
            FROM users
            WHERE email = $1
            LIMIT 1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| read_error(error, "find user by email"))?;

        row.map(|row| {
            Ok(UserCredentials {
                user: User::try_from(row.user)?,
                password_hash: row.password_hash,
            })
        })
        .transpose()
    }
}
