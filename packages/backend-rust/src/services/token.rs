use uuid::Uuid;

/// Source of assignment tokens. Implementations must be collision resistant;
/// the store's uniqueness check is the final guard.
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// 128-bit random token rendered as 32 lowercase hex chars.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenGenerator;

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}
