//! Fixed demo accounts for quick login in development builds.

use uuid::Uuid;

use crate::models::{Role, User};

pub fn seed_user(role: Role) -> User {
    match role {
        Role::Admin => User {
            id: Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0001),
            name: "Administrador Sistema".to_string(),
            email: "admin@ingenieriacopilot.com".to_string(),
            role,
            department: Some("Sistemas".to_string()),
            avatar: None,
        },
        Role::Engineer => User {
            id: Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0002),
            name: "Juan Pérez".to_string(),
            email: "juan.perez@ingenieriacopilot.com".to_string(),
            role,
            department: Some("Ingeniería".to_string()),
            avatar: None,
        },
        Role::Purchasing => User {
            id: Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0003),
            name: "María González".to_string(),
            email: "maria.gonzalez@ingenieriacopilot.com".to_string(),
            role,
            department: Some("Compras".to_string()),
            avatar: None,
        },
    }
}
