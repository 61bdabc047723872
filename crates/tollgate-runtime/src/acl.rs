//! Permission registry backing the tollgate's authorization checks

use anchor_lang::prelude::Pubkey;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tollgate::{AuthorizationOracle, Role, RoleId};
use tracing::{debug, info};

/// Entity that, once granted a role, lets every principal perform it
pub const ANY_ENTITY: Pubkey = Pubkey::new_from_array([0xff; 32]);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AclError {
    #[error("Permission {role} on {app} already has a manager")]
    PermissionAlreadyExists { app: Pubkey, role: Role },

    #[error("Permission {role} on {app} has no manager")]
    PermissionNotCreated { app: Pubkey, role: Role },

    #[error("{sender} is not the manager of {role} on {app}")]
    NotPermissionManager { sender: Pubkey, app: Pubkey, role: Role },

    #[error("Permission manager cannot be the null address")]
    InvalidManager,
}

/// Role grants keyed by (entity, app, role id), each role having one manager
/// per app that may grant and revoke it.
#[derive(Debug, Default)]
pub struct PermissionRegistry {
    grants: HashSet<(Pubkey, Pubkey, RoleId)>,
    managers: HashMap<(Pubkey, RoleId), Pubkey>,
}

impl PermissionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `role` on `app` to `entity` and make `manager` its manager
    pub fn create_permission(
        &mut self,
        entity: Pubkey,
        app: Pubkey,
        role: Role,
        manager: Pubkey,
    ) -> Result<(), AclError> {
        if manager == Pubkey::default() {
            return Err(AclError::InvalidManager);
        }
        let key = (app, role.id());
        if self.managers.contains_key(&key) {
            return Err(AclError::PermissionAlreadyExists { app, role });
        }

        self.managers.insert(key, manager);
        self.grants.insert((entity, app, role.id()));
        info!(%entity, %app, %role, %manager, "Permission created");
        Ok(())
    }

    pub fn grant_permission(
        &mut self,
        sender: &Pubkey,
        entity: Pubkey,
        app: Pubkey,
        role: Role,
    ) -> Result<(), AclError> {
        self.ensure_manager(sender, app, role)?;
        self.grants.insert((entity, app, role.id()));
        debug!(%entity, %app, %role, "Permission granted");
        Ok(())
    }

    pub fn revoke_permission(
        &mut self,
        sender: &Pubkey,
        entity: Pubkey,
        app: Pubkey,
        role: Role,
    ) -> Result<(), AclError> {
        self.ensure_manager(sender, app, role)?;
        self.grants.remove(&(entity, app, role.id()));
        debug!(%entity, %app, %role, "Permission revoked");
        Ok(())
    }

    /// Hand the manager seat of `role` on `app` to `new_manager`
    pub fn set_permission_manager(
        &mut self,
        sender: &Pubkey,
        new_manager: Pubkey,
        app: Pubkey,
        role: Role,
    ) -> Result<(), AclError> {
        if new_manager == Pubkey::default() {
            return Err(AclError::InvalidManager);
        }
        self.ensure_manager(sender, app, role)?;
        self.managers.insert((app, role.id()), new_manager);
        Ok(())
    }

    pub fn permission_manager(&self, app: &Pubkey, role: Role) -> Option<Pubkey> {
        self.managers.get(&(*app, role.id())).copied()
    }

    pub fn has_permission(&self, entity: &Pubkey, app: &Pubkey, role: Role) -> bool {
        let role_id = role.id();
        self.grants.contains(&(*entity, *app, role_id))
            || self.grants.contains(&(ANY_ENTITY, *app, role_id))
    }

    fn ensure_manager(&self, sender: &Pubkey, app: Pubkey, role: Role) -> Result<(), AclError> {
        match self.permission_manager(&app, role) {
            None => Err(AclError::PermissionNotCreated { app, role }),
            Some(manager) if manager != *sender => Err(AclError::NotPermissionManager {
                sender: *sender,
                app,
                role,
            }),
            Some(_) => Ok(()),
        }
    }
}

impl AuthorizationOracle for PermissionRegistry {
    fn may_perform(&self, principal: &Pubkey, instance: &Pubkey, role: Role) -> bool {
        self.has_permission(principal, instance, role)
    }
}
