// src/services/import/users.rs

use async_trait::async_trait;

use super::{
    engine::{invalid, ImportLayout, RowError, RowImporter},
    fields::parse_truthy,
    resolver::ClientCodeIndex,
    sheet::SheetRow,
};
use crate::{
    db::ImportStore,
    models::{
        client::normalize_code,
        user::{normalize_email, NewUser, UserRole, MIN_PASSWORD_LEN},
    },
    services::user_service::hash_password,
};

pub const LAYOUT: ImportLayout = ImportLayout {
    headers: &["nombre", "email", "rol", "cliente_codigo", "contraseña", "activo"],
    sheet_name: "Usuarios",
    file_name: "plantilla_usuarios.xlsx",
    noun: "usuarios importados",
    examples: &[
        &["Juan Pérez", "juan.perez@empresa.com", "AGENT", "CC-CL", "password123", "si"],
        &["María García", "maria.garcia@empresa.com", "ADMIN", "PE-CL", "password123", "si"],
        &["Carlos López", "carlos.lopez@empresa.com", "STORE_KEEPER", "NE-CL", "password123", "si"],
        &["Ana Admin", "ana.admin@empresa.com", "SUPER_ADMIN", "", "password123", "si"],
    ],
};

pub struct UserImporter {
    pub clients: ClientCodeIndex,
    pub bcrypt_cost: u32,
}

#[async_trait]
impl RowImporter for UserImporter {
    async fn import_row(&self, row: SheetRow<'_>, store: &dyn ImportStore) -> Result<(), RowError> {
        let name = row.get("nombre");
        let email = normalize_email(row.get("email"));
        let role_raw = row.get("rol").to_uppercase();
        let client_code = normalize_code(row.get("cliente_codigo"));
        let password = row.get("contraseña");

        if name.is_empty() {
            return invalid("El nombre es requerido");
        }
        if email.is_empty() {
            return invalid("El email es requerido");
        }
        if !email.contains('@') {
            return invalid("El email no es válido");
        }
        let Ok(role) = role_raw.parse::<UserRole>() else {
            return invalid(format!(
                "El rol \"{}\" no es válido. Roles válidos: {}",
                role_raw,
                UserRole::valid_list()
            ));
        };

        // SUPER_ADMIN ignora a coluna de cliente
        let client_id = if role.requires_client() {
            if client_code.is_empty() {
                return invalid(format!(
                    "El código de cliente es requerido para el rol \"{}\"",
                    role
                ));
            }
            match self.clients.resolve(&client_code) {
                Some(id) => Some(id),
                None => {
                    return invalid(format!(
                        "El cliente con código \"{}\" no existe",
                        client_code
                    ));
                }
            }
        } else {
            None
        };

        if password.chars().count() < MIN_PASSWORD_LEN {
            return invalid("La contraseña debe tener al menos 6 caracteres");
        }

        let password_hash = hash_password(password, self.bcrypt_cost).await?;
        let user = NewUser::new(
            name.to_string(),
            &email,
            password_hash,
            role,
            client_id,
            parse_truthy(row.get("activo")),
        )
        .map_err(|_| {
            RowError::Invalid(format!(
                "El código de cliente es requerido para el rol \"{}\"",
                role
            ))
        })?;

        if !store.insert_user(&user).await? {
            return invalid(format!("El email \"{}\" ya existe", user.email));
        }
        Ok(())
    }
}
