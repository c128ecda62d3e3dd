use super::*;

impl PostgresUserRepository {
    pub(super) async fn create_impl(&self, input: NewUser) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, name, password_hash, role_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, name, role_id, created_at
            "#,
        )
        .bind(UserId::new().as_uuid())
        .bind(input.email.as_str())
        .bind(input.name.as_str())
        .bind(input.password_hash.as_str())
        .bind(input.role_id.map(|role_id| role_id.as_uuid()))
        .fetch_one(&self.pool)
        .await
        .map_err(|error| user_write_error(error, "create user", Some(&input.email)))?;

        User::try_from(row)
    }

    pub(super) async fn update_impl(&self, user_id: UserId, changes: UserChanges) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                role_id = COALESCE($3, role_id)
            WHERE id = $1
            RETURNING id, email, name, role_id, created_at
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(changes.name.as_ref().map(|name| name.as_str()))
        .bind(changes.role_id.map(|role_id| role_id.as_uuid()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| user_write_error(error, "update user", None))?
        .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))?;

        User::try_from(row)
    }

    pub(super) async fn delete_impl(&self, user_id: UserId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| user_write_error(error, "delete user", None))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user '{user_id}' not found")));
        }

        Ok(())
    }
}
