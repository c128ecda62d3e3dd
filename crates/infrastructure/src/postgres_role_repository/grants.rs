use super::*;

impl PostgresRoleRepository {
    pub(super) async fn insert_role_grants_impl(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
        mode: GrantInsertMode,
    ) -> AppResult<usize> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let role_exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM roles WHERE id = $1)
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| read_error(error, "resolve role"))?;

        if !role_exists {
            return Err(role_not_found(role_id));
        }

        let statement = match mode {
            GrantInsertMode::RejectDuplicates => {
                r#"
                INSERT INTO role_permissions (role_id, permission_id)
                SELECT $1, UNNEST($2::uuid[])
                "#
            }
            GrantInsertMode::SkipExisting => {
                r#"
                INSERT INTO role_permissions (role_id, permission_id)
                SELECT $1, UNNEST($2::uuid[])
                ON CONFLICT (role_id, permission_id) DO NOTHING
                "#
            }
        };

        let ids: Vec<uuid::Uuid> = permission_ids.iter().map(PermissionId::as_uuid).collect();
        let result = sqlx::query(statement)
            .bind(role_id.as_uuid())
            .bind(ids)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                write_error(
                    error,
                    "insert role grants",
                    Some((
                        ConflictKind::DuplicateGrant,
                        format!("role '{role_id}' already holds one of the permissions"),
                    )),
                    Some("one or more permissions do not exist".to_owned()),
                )
            })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        usize::try_from(result.rows_affected())
            .map_err(|error| AppError::Internal(format!("grant count overflow: {error}")))
    }

    pub(super) async fn remove_role_grant_impl(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM role_permissions
            WHERE role_id = $1 AND permission_id = $2
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(permission_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| write_error(error, "remove role grant", None, None))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' is not granted to role '{role_id}'"
            )));
        }

        Ok(())
    }
}
