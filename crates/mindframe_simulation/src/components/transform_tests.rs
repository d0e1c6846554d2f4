//! Tests for validated transform mutation.

#[cfg(test)]
mod tests {
    use super::super::transform::{yaw_towards, TransformError, TransformExt};
    use bevy::prelude::*;

    #[test]
    fn test_rejects_nan_translation() {
        let mut transform = Transform::from_xyz(1.0, 2.0, 3.0);

        let result = transform.try_set_translation(Vec3::new(f32::NAN, 0.0, 0.0));

        assert!(matches!(result, Err(TransformError::Translation(_))));
        assert_eq!(transform.translation, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_rejects_infinite_scale_and_rotation() {
        let mut transform = Transform::default();

        assert!(transform.try_set_scale(Vec3::splat(f32::INFINITY)).is_err());
        assert!(transform
            .try_set_rotation(Quat::from_xyzw(f32::NAN, 0.0, 0.0, 1.0))
            .is_err());

        assert_eq!(transform.scale, Vec3::ONE);
        assert_eq!(transform.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_finite_values_are_applied() {
        let mut transform = Transform::default();
        let rotation = Quat::from_rotation_y(1.0);

        assert!(transform.try_set_translation(Vec3::new(4.0, 0.0, -2.0)).is_ok());
        assert!(transform.try_set_rotation(rotation).is_ok());
        assert!(transform.try_set_scale(Vec3::splat(2.0)).is_ok());

        assert_eq!(transform.translation, Vec3::new(4.0, 0.0, -2.0));
        assert_eq!(transform.rotation, rotation);
        assert_eq!(transform.scale, Vec3::splat(2.0));
    }

    #[test]
    fn test_yaw_towards_faces_direction() {
        let rotation = yaw_towards(Vec3::new(1.0, 5.0, 0.0)).unwrap();
        let forward = rotation * Vec3::NEG_Z;

        assert!((forward - Vec3::X).length() < 1e-5, "forward = {:?}", forward);
        assert!(yaw_towards(Vec3::Y).is_none());
    }
}
