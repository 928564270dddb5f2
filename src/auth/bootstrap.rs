use anyhow::Context;
use tracing::info;

use crate::{
    auth::password::hash_password,
    config::BootstrapAdmin,
    model::{
        employee::{NewEmployee, normalize_email},
        role::Role,
    },
    store::VacationStore,
};

/// Creates the configured administrator unless that email is already taken.
pub async fn seed_admin(store: &dyn VacationStore, admin: &BootstrapAdmin) -> anyhow::Result<()> {
    let email = normalize_email(&admin.email);
    if store.find_employee_by_email(&email).await?.is_some() {
        info!(%email, "Bootstrap administrator already present");
        return Ok(());
    }

    let password_hash = hash_password(&admin.password)
        .map_err(|e| anyhow::anyhow!("hash bootstrap password: {e}"))?;

    let created = store
        .insert_employee(NewEmployee {
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            email,
            password_hash,
            role: Role::Administrator,
            location_id: None,
            supervisor_id: None,
        })
        .await
        .context("create bootstrap administrator")?;

    info!(employee_id = created.id, "Bootstrap administrator created");
    Ok(())
}
