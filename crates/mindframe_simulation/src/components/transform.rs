//! Validated transform mutation.
//!
//! Физика и netcode могут подсунуть NaN/Inf. Любая запись translation,
//! rotation, scale из симуляции идёт через `TransformExt`: non-finite
//! отклоняется, сохранённое значение не трогаем.

use bevy::prelude::*;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TransformError {
    #[error("rejected non-finite translation {0:?}")]
    Translation(Vec3),
    #[error("rejected non-finite rotation {0:?}")]
    Rotation(Quat),
    #[error("rejected non-finite scale {0:?}")]
    Scale(Vec3),
}

pub trait TransformExt {
    fn try_set_translation(&mut self, translation: Vec3) -> Result<(), TransformError>;
    fn try_set_rotation(&mut self, rotation: Quat) -> Result<(), TransformError>;
    fn try_set_scale(&mut self, scale: Vec3) -> Result<(), TransformError>;
}

impl TransformExt for Transform {
    fn try_set_translation(&mut self, translation: Vec3) -> Result<(), TransformError> {
        if !translation.is_finite() {
            return Err(reject(TransformError::Translation(translation)));
        }
        self.translation = translation;
        Ok(())
    }

    fn try_set_rotation(&mut self, rotation: Quat) -> Result<(), TransformError> {
        if !rotation.is_finite() {
            return Err(reject(TransformError::Rotation(rotation)));
        }
        self.rotation = rotation;
        Ok(())
    }

    fn try_set_scale(&mut self, scale: Vec3) -> Result<(), TransformError> {
        if !scale.is_finite() {
            return Err(reject(TransformError::Scale(scale)));
        }
        self.scale = scale;
        Ok(())
    }
}

fn reject(error: TransformError) -> TransformError {
    crate::log_warning(&format!("Transform: {}", error));
    error
}

/// Yaw-only look rotation (forward = -Z). `None` for a degenerate direction.
pub fn yaw_towards(direction: Vec3) -> Option<Quat> {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    if flat.length_squared() < 1e-6 || !flat.is_finite() {
        return None;
    }
    Some(Quat::from_rotation_y(f32::atan2(-flat.x, -flat.z)))
}
