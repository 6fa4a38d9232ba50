// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ownership and visibility checks for user-owned resources.
//!
//! A resource is readable by its owner or by anyone when public, and
//! writable only by its owner. Handlers load a record, then pass it
//! through [`readable`] or [`writable`] which turn a missing record into
//! 404 and a foreign one into 403.

use crate::error::AppError;
use crate::models::{Exercise, ScheduledWorkout, User, WorkoutPlan};
use uuid::Uuid;

/// A record with an owning user.
pub trait OwnedResource {
    /// Human-readable resource kind for error messages.
    const KIND: &'static str;

    fn resource_id(&self) -> Uuid;

    /// `None` when the owner has been deleted.
    fn owner_id(&self) -> Option<Uuid>;

    fn is_public(&self) -> bool {
        false
    }
}

impl OwnedResource for Exercise {
    const KIND: &'static str = "exercise";

    fn resource_id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Option<Uuid> {
        self.created_by
    }

    fn is_public(&self) -> bool {
        self.is_public
    }
}

impl OwnedResource for WorkoutPlan {
    const KIND: &'static str = "workout plan";

    fn resource_id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }
}

impl OwnedResource for ScheduledWorkout {
    const KIND: &'static str = "scheduled workout";

    fn resource_id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }
}

fn is_owner<R: OwnedResource>(resource: &R, user: &User) -> bool {
    resource.owner_id() == Some(user.id)
}

pub fn can_read<R: OwnedResource>(resource: &R, user: &User) -> bool {
    is_owner(resource, user) || resource.is_public()
}

pub fn can_write<R: OwnedResource>(resource: &R, user: &User) -> bool {
    is_owner(resource, user)
}

pub fn ensure_can_read<R: OwnedResource>(resource: &R, user: &User) -> Result<(), AppError> {
    if can_read(resource, user) {
        Ok(())
    } else {
        tracing::debug!(kind = R::KIND, id = %resource.resource_id(), user_id = %user.id, "Read denied");
        Err(AppError::Forbidden(format!(
            "Not enough permissions to view this {}",
            R::KIND
        )))
    }
}

pub fn ensure_can_write<R: OwnedResource>(resource: &R, user: &User) -> Result<(), AppError> {
    if can_write(resource, user) {
        Ok(())
    } else {
        tracing::debug!(kind = R::KIND, id = %resource.resource_id(), user_id = %user.id, "Write denied");
        Err(AppError::Forbidden(format!(
            "Not enough permissions to modify this {}",
            R::KIND
        )))
    }
}

fn found<R: OwnedResource>(resource: Option<R>, id: Uuid) -> Result<R, AppError> {
    resource.ok_or_else(|| AppError::NotFound(format!("{} {id}", R::KIND)))
}

/// 404 if missing, 403 if not readable by `user`.
pub fn readable<R: OwnedResource>(resource: Option<R>, id: Uuid, user: &User) -> Result<R, AppError> {
    let resource = found(resource, id)?;
    ensure_can_read(&resource, user)?;
    Ok(resource)
}

/// 404 if missing, 403 if not writable by `user`.
pub fn writable<R: OwnedResource>(resource: Option<R>, id: Uuid, user: &User) -> Result<R, AppError> {
    let resource = found(resource, id)?;
    ensure_can_write(&resource, user)?;
    Ok(resource)
}
