use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Login handle, also the public profile name on the external service.
    #[sea_orm(unique)]
    pub handle: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// One of: member, operator, administrator, developer
    pub role: String,

    pub is_verified: bool,

    /// Present while the account is unverified ("RH" + 5 digits)
    pub verification_code: Option<String>,

    pub created_at: String,

    /// Set exactly once, at promotion to verified.
    pub verified_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
