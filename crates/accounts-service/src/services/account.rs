//! Account service
//!
//! Registration, profile edits, self removal and the admin operations on
//! user accounts. Rejected input comes back as [`ServiceError::Form`] with
//! catalogue ids per field.

use accounts_cache::{FlashKind, SessionData, SessionUser};
use accounts_common::{
    AppError, ACCOUNT_DELETE_INTENTION, ACCOUNT_INTENTION, ADMIN_INTENTION,
};
use accounts_core::{DomainError, EntityId, IncludeDeleted, OrderBy, User, ROLE_ADMIN};
use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::dto::{AccountForm, AccountFormView, FormErrors, RemoveAccountForm, UserSummary};

use super::auth::AuthService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Account service
pub struct AccountService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AccountService<'a> {
    /// Create a new AccountService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // ========================================================================
    // Pages
    // ========================================================================

    /// Register or edit page, with translated errors when re-rendered
    pub fn form_page(
        &self,
        session: &mut SessionData,
        form: AccountForm,
        errors: Option<&FormErrors>,
        locale: &str,
    ) -> AccountFormView {
        AccountFormView {
            form,
            errors: errors
                .map(|e| e.translate(self.ctx.translator(), locale))
                .unwrap_or_default(),
            csrf_token: self.ctx.csrf().token(session, ACCOUNT_INTENTION),
        }
    }

    /// Token for the removal form
    pub fn delete_token(&self, session: &mut SessionData) -> String {
        self.ctx.csrf().token(session, ACCOUNT_DELETE_INTENTION)
    }

    /// Token for admin actions
    pub fn admin_token(&self, session: &mut SessionData) -> String {
        self.ctx.csrf().token(session, ADMIN_INTENTION)
    }

    // ========================================================================
    // Self service
    // ========================================================================

    /// Create an account and log it in
    #[instrument(skip(self, form, session), fields(username = %form.username))]
    pub async fn register(
        &self,
        mut form: AccountForm,
        session: &mut SessionData,
        ip: Option<&str>,
    ) -> ServiceResult<User> {
        form.normalize();
        let mut errors = self.check_form(&form, session);

        if form.username.is_empty() {
            errors.add("username", "username.blank");
        }
        match form.password.as_deref() {
            Some(password) => self.check_password(password, &mut errors),
            None => errors.add("password", "password.blank"),
        }

        if !form.username.is_empty()
            && self.ctx.user_repo().username_exists(&form.username, None).await?
        {
            errors.add("username", "username.taken");
        }
        self.check_email(&form, None, &mut errors).await?;
        errors.into_result()?;

        let mut user = User::new(form.username.clone(), None);
        user.audit.owner = Some(user.audit.id);
        form.apply_profile(&mut user);
        user.password_hash = Some(self.encode_password(&form, ip)?);
        user.validate()?;

        self.ctx
            .user_repo()
            .create(&user)
            .await
            .map_err(conflict_to_form)?;
        info!(ip_address = ip.unwrap_or("-"), user = %user.username, "Account created.");

        AuthService::new(self.ctx).login(&mut user, session).await?;
        session.add_flash(FlashKind::Success, "sentence.account_register_success");
        Ok(user)
    }

    /// Update the profile of a logged-in user. The username never changes.
    #[instrument(skip(self, user, form, session), fields(user = %user.username))]
    pub async fn edit(
        &self,
        mut user: User,
        mut form: AccountForm,
        session: &mut SessionData,
        ip: Option<&str>,
    ) -> ServiceResult<User> {
        form.normalize();
        form.username.clone_from(&user.username);
        let mut errors = self.check_form(&form, session);

        if let Some(password) = form.password.as_deref() {
            self.check_password(password, &mut errors);
        }
        self.check_email(&form, Some(user.audit.id), &mut errors).await?;
        if let Err(errors) = errors.into_result() {
            warn!(ip_address = ip.unwrap_or("-"), user = %user.username, "Account update failed.");
            return Err(errors.into());
        }

        form.apply_profile(&mut user);
        if form.password.is_some() {
            user.password_hash = Some(self.encode_password(&form, ip)?);
        }
        user.validate()?;

        self.ctx
            .user_repo()
            .update(&mut user)
            .await
            .map_err(conflict_to_form)?;
        info!(ip_address = ip.unwrap_or("-"), user = %user.username, "Account updated.");

        session.user = Some(SessionUser::from(&user));
        session.add_flash(FlashKind::Success, "sentence.account_edit_success");
        Ok(user)
    }

    /// Soft delete the user's own account and log out
    #[instrument(skip(self, user, form, session), fields(user = %user.username))]
    pub async fn remove(
        &self,
        mut user: User,
        form: RemoveAccountForm,
        session: &mut SessionData,
        ip: Option<&str>,
    ) -> ServiceResult<User> {
        self.ctx
            .verify_csrf(session, ACCOUNT_DELETE_INTENTION, &form.token)?;

        let id = user.audit.id;
        if let Err(e) = user.audit.delete(Some(id), form.comment.as_deref()) {
            return Err(match e {
                DomainError::TooLong { max, .. } => {
                    let mut errors = FormErrors::new();
                    errors.add_with("comment", "comment.too_long", vec![("max".into(), max.to_string())]);
                    errors.into()
                }
                other => other.into(),
            });
        }
        self.ctx.user_repo().update(&mut user).await?;
        info!(ip_address = ip.unwrap_or("-"), user = %user.username, "Account removed.");

        session.logout();
        session.add_flash(FlashKind::Success, "sentence.account_delete_success");
        Ok(user)
    }

    // ========================================================================
    // Administration
    // ========================================================================

    /// Fails with `InsufficientPermissions` unless the actor is an admin
    pub fn require_admin(&self, actor: &User) -> ServiceResult<()> {
        if actor.has_role(ROLE_ADMIN)? {
            Ok(())
        } else {
            Err(AppError::InsufficientPermissions.into())
        }
    }

    /// Users admitted by the deletion filter
    #[instrument(skip(self, actor), fields(actor = %actor.username))]
    pub async fn list(
        &self,
        actor: &User,
        include: IncludeDeleted,
        order_by: &OrderBy,
    ) -> ServiceResult<Vec<UserSummary>> {
        self.require_admin(actor)?;
        let users = self.ctx.user_repo().find_all(order_by, include).await?;
        Ok(users
            .iter()
            .map(|u| UserSummary::new(u, self.ctx.zones()))
            .collect())
    }

    /// Undelete a soft-deleted account
    #[instrument(skip(self, actor, token, session), fields(actor = %actor.username))]
    pub async fn restore(
        &self,
        actor: &User,
        id: EntityId,
        token: &str,
        session: &mut SessionData,
    ) -> ServiceResult<User> {
        self.require_admin(actor)?;
        self.ctx.verify_csrf(session, ADMIN_INTENTION, token)?;

        let mut user = self
            .ctx
            .user_repo()
            .find_by_id(id, IncludeDeleted::Exclusive)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id.to_string()))?;
        user.audit.undelete();
        self.ctx.user_repo().update(&mut user).await?;
        info!(actor = %actor.username, user = %user.username, "Account restored.");

        session.add_flash(FlashKind::Success, "sentence.account_restore_success");
        Ok(user)
    }

    /// Hard delete an account, deleted or not
    #[instrument(skip(self, actor, token, session), fields(actor = %actor.username))]
    pub async fn purge(
        &self,
        actor: &User,
        id: EntityId,
        token: &str,
        session: &mut SessionData,
    ) -> ServiceResult<User> {
        self.require_admin(actor)?;
        self.ctx.verify_csrf(session, ADMIN_INTENTION, token)?;

        let mut user = self
            .ctx
            .user_repo()
            .find_by_id(id, IncludeDeleted::Yes)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id.to_string()))?;
        self.ctx.user_repo().purge(&mut user).await?;
        info!(actor = %actor.username, user = %user.username, "Account purged.");

        session.add_flash(FlashKind::Success, "sentence.account_purge_success");
        Ok(user)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Declarative constraints, password confirmation and the CSRF token
    fn check_form(&self, form: &AccountForm, session: &SessionData) -> FormErrors {
        let mut errors = match form.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(&e),
        };
        if form.password != form.password_repeat {
            errors.add("password_repeat", "password.mismatch");
        }
        if !self.ctx.csrf().is_valid(session, ACCOUNT_INTENTION, &form.token) {
            errors.add("_token", "csrf.invalid");
        }
        errors
    }

    fn check_password(&self, password: &str, errors: &mut FormErrors) {
        let policy = self.ctx.passwords().policy();
        match policy.violation(password) {
            Some(key @ "password.too_short") => {
                errors.add_with("password", key, vec![("min".into(), policy.min_length.to_string())]);
            }
            Some(key) => errors.add("password", key),
            None => {}
        }
    }

    async fn check_email(
        &self,
        form: &AccountForm,
        except: Option<EntityId>,
        errors: &mut FormErrors,
    ) -> ServiceResult<()> {
        if let Some(email) = form.email.as_deref() {
            if !errors.has("email") && self.ctx.user_repo().email_exists(email, except).await? {
                errors.add("email", "email.taken");
            }
        }
        Ok(())
    }

    fn encode_password(&self, form: &AccountForm, ip: Option<&str>) -> ServiceResult<String> {
        let password = form.password.as_deref().unwrap_or_default();
        self.ctx.passwords().hash(password).map_err(|e| {
            error!(
                ip_address = ip.unwrap_or("-"),
                user = %form.username,
                field = "password",
                reason = %e,
                "Account creation failed."
            );
            let mut errors = FormErrors::new();
            errors.add("password", "sentence.password_encoding_failed");
            errors.into()
        })
    }
}

/// Unique key violations raced past the existence checks
fn conflict_to_form(err: DomainError) -> ServiceError {
    let mut errors = FormErrors::new();
    match err {
        DomainError::UsernameAlreadyExists => errors.add("username", "username.taken"),
        DomainError::EmailAlreadyExists => errors.add("email", "email.taken"),
        other => return other.into(),
    }
    errors.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{context, seed_user, PASSWORD};
    use accounts_core::UserRepository;

    fn register_form(ctx: &ServiceContext, session: &mut SessionData, username: &str) -> AccountForm {
        AccountForm {
            username: username.to_string(),
            first_name: Some("Jane".to_string()),
            email: Some(format!("{username}@example.com")),
            password: Some(PASSWORD.to_string()),
            password_repeat: Some(PASSWORD.to_string()),
            token: ctx.csrf().token(session, ACCOUNT_INTENTION),
            ..AccountForm::default()
        }
    }

    fn form_errors(err: ServiceError) -> FormErrors {
        match err {
            ServiceError::Form(errors) => errors,
            other => panic!("expected form errors, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_register_logs_in() {
        let (ctx, repo) = context();
        let mut session = SessionData::new();
        let form = register_form(&ctx, &mut session, "jdoe");

        let user = AccountService::new(&ctx)
            .register(form, &mut session, Some("10.0.0.1"))
            .await
            .unwrap();

        assert_eq!(user.audit.owner, Some(user.audit.id));
        assert!(user.password_hash.as_deref().is_some_and(|h| h.starts_with("$argon2id$")));
        assert_eq!(repo.len(), 1);
        assert_eq!(session.user.as_ref().map(|u| u.id), Some(user.audit.id));
        assert_eq!(session.flashes()[0].message, "sentence.account_register_success");
    }

    #[tokio::test]
    async fn test_register_field_errors() {
        let (ctx, repo) = context();
        seed_user(&repo, "taken", "taken@example.com").await;
        let service = AccountService::new(&ctx);

        let mut session = SessionData::new();
        let mut form = register_form(&ctx, &mut session, "taken");
        form.email = Some("taken@example.com".to_string());
        form.password = Some("short".to_string());
        form.password_repeat = Some("other".to_string());
        form.token = "forged".to_string();

        let errors = form_errors(service.register(form, &mut session, None).await.unwrap_err());
        assert_eq!(errors.get("username")[0].message, "username.taken");
        assert_eq!(errors.get("email")[0].message, "email.taken");
        assert_eq!(errors.get("password")[0].message, "password.too_short");
        assert_eq!(errors.get("password")[0].params, vec![("min".to_string(), "8".to_string())]);
        assert_eq!(errors.get("password_repeat")[0].message, "password.mismatch");
        assert_eq!(errors.get("_token")[0].message, "csrf.invalid");
        assert!(!session.is_authenticated());
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_register_long_email_is_a_field_error() {
        let (ctx, repo) = context();
        let mut session = SessionData::new();
        let mut form = register_form(&ctx, &mut session, "jdoe");
        let domain = ["a", "b", "c", "d"].map(|c| c.repeat(50)).join(".");
        form.email = Some(format!("jdoe@{domain}.com"));

        let errors = form_errors(
            AccountService::new(&ctx)
                .register(form, &mut session, None)
                .await
                .unwrap_err(),
        );
        assert_eq!(errors.get("email")[0].message, "email.too_long");
        assert_eq!(errors.get("email")[0].params, vec![("max".to_string(), "200".to_string())]);
        assert_eq!(errors.len(), 1);
        assert_eq!(repo.len(), 0);
    }

    #[tokio::test]
    async fn test_register_missing_confirmation() {
        let (ctx, _) = context();
        let mut session = SessionData::new();
        let mut form = register_form(&ctx, &mut session, "jdoe");
        form.password_repeat = Some(String::new());

        let errors = form_errors(
            AccountService::new(&ctx)
                .register(form, &mut session, None)
                .await
                .unwrap_err(),
        );
        assert_eq!(errors.get("password_repeat")[0].message, "password.mismatch");
        assert_eq!(errors.len(), 1);
    }

    #[tokio::test]
    async fn test_register_requires_username_and_password() {
        let (ctx, _) = context();
        let mut session = SessionData::new();
        let mut form = register_form(&ctx, &mut session, "   ");
        form.email = None;
        form.password = None;
        form.password_repeat = None;

        let errors = form_errors(
            AccountService::new(&ctx)
                .register(form, &mut session, None)
                .await
                .unwrap_err(),
        );
        assert_eq!(errors.get("username")[0].message, "username.blank");
        assert_eq!(errors.get("password")[0].message, "password.blank");
        assert_eq!(errors.len(), 2);
    }

    #[tokio::test]
    async fn test_register_taken_by_deleted_user() {
        let (ctx, repo) = context();
        let mut gone = seed_user(&repo, "gone", "gone@example.com").await;
        gone.audit.delete(None, None).unwrap();
        repo.update(&mut gone).await.unwrap();

        let mut session = SessionData::new();
        let form = register_form(&ctx, &mut session, "gone");
        let errors = form_errors(
            AccountService::new(&ctx)
                .register(form, &mut session, None)
                .await
                .unwrap_err(),
        );
        assert!(errors.has("username"));
        assert!(errors.has("email"));
    }

    #[tokio::test]
    async fn test_edit_keeps_username() {
        let (ctx, repo) = context();
        let user = seed_user(&repo, "jdoe", "jane@example.com").await;
        let original_hash = user.password_hash.clone();
        let mut session = SessionData::new();
        session.login(SessionUser::from(&user));

        let form = AccountForm {
            username: "renamed".to_string(),
            display_name: Some("JD".to_string()),
            email: Some("new@example.com".to_string()),
            token: ctx.csrf().token(&mut session, ACCOUNT_INTENTION),
            ..AccountForm::default()
        };
        let updated = AccountService::new(&ctx)
            .edit(user, form, &mut session, None)
            .await
            .unwrap();

        assert_eq!(updated.username, "jdoe");
        assert_eq!(updated.display_name.as_deref(), Some("JD"));
        assert_eq!(updated.password_hash, original_hash);
        assert!(updated.audit.modified_at.is_some());
        assert_eq!(session.flashes()[0].message, "sentence.account_edit_success");
    }

    #[tokio::test]
    async fn test_edit_rejects_other_users_email() {
        let (ctx, repo) = context();
        seed_user(&repo, "other", "other@example.com").await;
        let user = seed_user(&repo, "jdoe", "jane@example.com").await;
        let mut session = SessionData::new();

        let mut form = AccountForm::from_user(&user);
        form.email = Some("other@example.com".to_string());
        form.token = ctx.csrf().token(&mut session, ACCOUNT_INTENTION);
        let errors = form_errors(
            AccountService::new(&ctx)
                .edit(user.clone(), form, &mut session, None)
                .await
                .unwrap_err(),
        );
        assert_eq!(errors.get("email")[0].message, "email.taken");

        // Own email is not a conflict
        let mut form = AccountForm::from_user(&user);
        form.token = ctx.csrf().token(&mut session, ACCOUNT_INTENTION);
        assert!(AccountService::new(&ctx)
            .edit(user, form, &mut session, None)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_remove_soft_deletes_and_logs_out() {
        let (ctx, repo) = context();
        let user = seed_user(&repo, "jdoe", "jane@example.com").await;
        let id = user.audit.id;
        let mut session = SessionData::new();
        session.login(SessionUser::from(&user));
        let service = AccountService::new(&ctx);

        let form = RemoveAccountForm {
            comment: Some("  leaving  ".to_string()),
            token: service.delete_token(&mut session),
        };
        let removed = service.remove(user, form, &mut session, None).await.unwrap();

        assert_eq!(removed.audit.deleter, Some(id));
        assert_eq!(removed.audit.deleter_comment.as_deref(), Some("leaving"));
        assert!(!session.is_authenticated());
        assert!(repo.find_by_id(id, IncludeDeleted::No).await.unwrap().is_none());
        assert!(repo.find_by_id(id, IncludeDeleted::Exclusive).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_remove_comment_too_long() {
        let (ctx, repo) = context();
        let user = seed_user(&repo, "jdoe", "jane@example.com").await;
        let mut session = SessionData::new();
        let service = AccountService::new(&ctx);
        let form = RemoveAccountForm {
            comment: Some("x".repeat(201)),
            token: service.delete_token(&mut session),
        };

        let errors = form_errors(service.remove(user, form, &mut session, None).await.unwrap_err());
        assert_eq!(errors.get("comment")[0].message, "comment.too_long");
    }

    #[tokio::test]
    async fn test_admin_operations() {
        let (ctx, repo) = context();
        let mut admin = seed_user(&repo, "admin", "admin@example.com").await;
        admin.add_role(ROLE_ADMIN).unwrap();
        repo.update(&mut admin).await.unwrap();
        let mut target = seed_user(&repo, "jdoe", "jane@example.com").await;
        target.audit.delete(None, Some("spam")).unwrap();
        repo.update(&mut target).await.unwrap();

        let service = AccountService::new(&ctx);
        let mut session = SessionData::new();
        let token = service.admin_token(&mut session);
        let order = OrderBy::new().asc("username");

        let deleted = service.list(&admin, IncludeDeleted::Exclusive, &order).await.unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].deleter_comment.as_deref(), Some("spam"));

        let restored = service
            .restore(&admin, target.audit.id, &token, &mut session)
            .await
            .unwrap();
        assert!(!restored.audit.is_deleted());
        assert!(restored.audit.deleter_comment.is_none());

        // Already active
        let err = service
            .restore(&admin, target.audit.id, &token, &mut session)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);

        let purged = service
            .purge(&admin, target.audit.id, &token, &mut session)
            .await
            .unwrap();
        assert_eq!(purged.audit.deleter_comment.as_deref(), Some(accounts_core::PURGE_COMMENT));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_admin_requires_role_and_token() {
        let (ctx, repo) = context();
        let user = seed_user(&repo, "jdoe", "jane@example.com").await;
        let service = AccountService::new(&ctx);
        let mut session = SessionData::new();

        let err = service
            .list(&user, IncludeDeleted::Yes, &OrderBy::new())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);

        let mut admin = user.clone();
        admin.add_role(ROLE_ADMIN).unwrap();
        let err = service
            .purge(&admin, user.audit.id, "forged", &mut session)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid CSRF token.");
    }
}
