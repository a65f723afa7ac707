//! Authentication and user account service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        user::{AuthPayload, LoginUser, NewUser, RegisterUser, Role, User, UserClaims},
        Identity,
    },
    repository::Repository,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account and return a token for it.
    ///
    /// Admin accounts can only be created by an admin, unless
    /// `allow_admin_registration` is set.
    pub async fn register(&self, identity: &Identity, request: RegisterUser) -> AppResult<AuthPayload> {
        let role = request.role.unwrap_or_default();
        if role == Role::Admin && !identity.is_admin() && !self.config.allow_admin_registration {
            return Err(AppError::Authorization(
                "Admin access required to register an Admin".to_string(),
            ));
        }

        request.validate()?;

        if self.repository.users.get_by_email(&request.email).await?.is_some() {
            return Err(AppError::InvalidState("User already exists".to_string()));
        }

        let password_hash = self.hash_password(&request.password)?;
        let user = self
            .repository
            .users
            .create(&NewUser {
                name: request.name,
                email: request.email,
                password_hash,
                role,
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");

        self.payload_for(user)
    }

    /// Authenticate by email and password
    pub async fn login(&self, request: LoginUser) -> AppResult<AuthPayload> {
        let user = self
            .repository
            .users
            .get_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !self.verify_password(&user, &request.password)? {
            tracing::debug!(user_id = %user.id, "Rejected login with wrong password");
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        tracing::info!(user_id = %user.id, "User logged in");

        self.payload_for(user)
    }

    /// The caller's own account
    pub async fn me(&self, identity: &Identity) -> AppResult<User> {
        let user_id = identity.require_user()?;
        self.load_user(user_id).await
    }

    /// Any account, visible to its owner and to admins
    pub async fn get_user(&self, identity: &Identity, user_id: Uuid) -> AppResult<User> {
        let caller = identity.require_user()?;
        if caller != user_id {
            identity.require_admin()?;
        }
        self.load_user(user_id).await
    }

    /// Resolve a bearer token, rejecting invalid or stale ones
    pub async fn authenticate(&self, token: &str) -> AppResult<Identity> {
        let claims = UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(format!("Not authorized, token failed: {}", e)))?;

        // The stored role wins over the one baked into the token
        let user = self
            .repository
            .users
            .get_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::Authentication("Not authorized, user no longer exists".to_string()))?;

        Ok(Identity::authenticated(user.id, user.role))
    }

    /// Like `authenticate`, but missing or bad tokens fall back to anonymous
    pub async fn identify(&self, token: Option<&str>) -> AppResult<Identity> {
        let Some(token) = token else {
            return Ok(Identity::Anonymous);
        };

        match self.authenticate(token).await {
            Ok(identity) => Ok(identity),
            Err(AppError::Authentication(reason)) => {
                tracing::debug!(%reason, "Treating caller as anonymous");
                Ok(Identity::Anonymous)
            }
            Err(e) => Err(e),
        }
    }

    /// Create a signed JWT for a user
    pub fn issue_token(&self, user_id: Uuid, role: Role) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user_id,
            role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        if user.password_hash.is_empty() {
            return Ok(false);
        }
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    async fn load_user(&self, user_id: Uuid) -> AppResult<User> {
        self.repository
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    fn payload_for(&self, user: User) -> AppResult<AuthPayload> {
        let token = self.issue_token(user.id, user.role)?;
        Ok(AuthPayload {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            token,
        })
    }
}
