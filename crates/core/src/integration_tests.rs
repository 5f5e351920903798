//! Integration tests: exercise full flows against a simulated mouse.
//!
//! These tests attach a simulated two-zone mouse, drive it through profile
//! changes, synchronization, and storage round-trips across modules, and
//! check the exact reports it receives.

#[cfg(test)]
mod tests {
    use crate::color::Rgb;
    use crate::device::{DeviceHandle, DeviceInfo, MouseModel};
    use crate::error::Error;
    use crate::lighting::{LightingState, KEYBOARD_ZONES, MOUSE_ZONES};
    use crate::persist;
    use crate::profile::{load_profile, save_profile, Profile};
    use crate::scheduler::{lock_device, synchronize_shared, SyncScheduler, TickOutcome};
    use crate::sync::synchronize;
    use crate::transport::mock::MockTransport;
    use std::sync::Arc;
    use std::thread;

    /// Attach a simulated mouse whose last confirmed state is settled dark.
    fn attach_mouse(profile: Profile) -> (DeviceHandle, Arc<MockTransport>) {
        let mock = Arc::new(MockTransport::new());
        let mut dev = DeviceHandle::new(
            DeviceInfo::for_model(MouseModel::M65),
            Box::new(Arc::clone(&mock)),
            profile,
        );
        dev.last_light = LightingState::dark();
        (dev, mock)
    }

    fn hex(bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Dark mouse lit red/green: colour report then activation, then settled.
    #[test]
    fn dark_to_red_green_scenario() {
        let mut profile = Profile::default();
        profile
            .current_mode_mut()
            .lighting
            .range_mut(MOUSE_ZONES)
            .copy_from_slice(&[Rgb::new(255, 0, 0), Rgb::new(0, 255, 0)]);
        let (mut dev, mock) = attach_mouse(profile);

        synchronize(&mut dev, false).unwrap();

        let sent = mock.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(
            hex(&sent[0].as_bytes()[..13]),
            "07 22 04 01 01 FF 00 00 02 00 FF 00 00"
        );
        assert!(sent[0].as_bytes()[13..].iter().all(|&b| b == 0));
        assert_eq!(hex(&sent[1].as_bytes()[..5]), "07 05 02 00 01");
        assert_eq!(dev.last_light, dev.profile.current_mode().lighting);
    }

    /// Switching modes flags a resync even when the zones happen to match.
    #[test]
    fn mode_switch_resends_matching_colors() {
        let mut profile = Profile::default();
        profile.current_mode_mut().lighting.fill(MOUSE_ZONES, Rgb::BLUE);
        let second = profile.add_mode("Also blue");
        profile
            .mode_mut(second)
            .unwrap()
            .lighting
            .fill(MOUSE_ZONES, Rgb::BLUE);
        let (mut dev, mock) = attach_mouse(profile);

        synchronize(&mut dev, false).unwrap();
        mock.clear_sent();

        dev.profile.select_mode(second).unwrap();
        synchronize(&mut dev, false).unwrap();

        // Lit to lit: colour only, no activation toggle.
        let sent = mock.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(hex(&sent[0].as_bytes()[..4]), "07 22 04 01");

        mock.clear_sent();
        synchronize(&mut dev, false).unwrap();
        assert_eq!(mock.sent_count(), 0);
    }

    /// A mode switch saved to disk and reloaded still forces a resend.
    #[test]
    fn mode_switch_through_profile_file_resends() {
        let mut profile = Profile::default();
        profile.current_mode_mut().lighting.fill(MOUSE_ZONES, Rgb::BLUE);
        let second = profile.add_mode("Also blue");
        profile
            .mode_mut(second)
            .unwrap()
            .lighting
            .fill(MOUSE_ZONES, Rgb::BLUE);
        let (mut dev, mock) = attach_mouse(profile.clone());

        synchronize(&mut dev, false).unwrap();
        mock.clear_sent();

        let dir = std::env::temp_dir().join(format!("hidlight-switch-{}", std::process::id()));
        let path = dir.join("profile.json");
        profile.select_mode(second).unwrap();
        save_profile(&profile, &path).unwrap();
        let reloaded = load_profile(&path).unwrap();
        let _ = std::fs::remove_dir_all(&dir);
        assert!(!reloaded.current_mode().lighting.force_update);

        assert!(dev.replace_profile(reloaded));
        synchronize(&mut dev, false).unwrap();

        let sent = mock.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(hex(&sent[0].as_bytes()[..4]), "07 22 04 01");

        // Reloading the unchanged file is a no-op.
        mock.clear_sent();
        assert!(!dev.replace_profile(dev.profile.clone()));
        synchronize(&mut dev, false).unwrap();
        assert_eq!(mock.sent_count(), 0);
    }

    /// Switching to an all-dark mode turns the lighting hardware off.
    #[test]
    fn mode_switch_to_dark_deactivates() {
        let mut profile = Profile::default();
        profile.current_mode_mut().lighting.fill(MOUSE_ZONES, Rgb::RED);
        let off = profile.add_mode("Off");
        let (mut dev, mock) = attach_mouse(profile);

        synchronize(&mut dev, false).unwrap();
        mock.clear_sent();
        dev.profile.select_mode(off).unwrap();
        synchronize(&mut dev, false).unwrap();

        let sent = mock.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(
            hex(&sent[0].as_bytes()[..12]),
            "07 22 04 01 01 00 00 00 02 00 00 00"
        );
        assert_eq!(hex(&sent[1].as_bytes()[..5]), "07 05 02 00 00");
    }

    /// Stored colours survive a save/load cycle and can drive the profile.
    #[test]
    fn stored_lighting_roundtrip_into_profile() {
        let mut saved = LightingState::dark();
        saved
            .range_mut(MOUSE_ZONES)
            .copy_from_slice(&[Rgb::new(0x11, 0x22, 0x33), Rgb::new(0x44, 0x55, 0x66)]);
        let (mut dev, mock) = attach_mouse(Profile::default());

        persist::save_to_device(&dev, &saved).unwrap();
        assert_eq!(mock.stored(1), Some(Rgb::new(0x11, 0x22, 0x33)));
        assert_eq!(mock.stored(2), Some(Rgb::new(0x44, 0x55, 0x66)));

        let mut target = dev.profile.current_mode().lighting.clone();
        target.fill(KEYBOARD_ZONES, Rgb::WHITE);
        persist::load_into(&dev, &mut target).unwrap();
        assert_eq!(target.range(MOUSE_ZONES), saved.range(MOUSE_ZONES));
        assert_eq!(target.range(KEYBOARD_ZONES)[0], Rgb::WHITE);

        // Adopt the stored colours as the desired lighting.
        dev.profile.current_mode_mut().lighting = target;
        mock.clear_sent();
        synchronize(&mut dev, false).unwrap();
        let sent = mock.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(
            hex(&sent[0].as_bytes()[..12]),
            "07 22 04 01 01 11 22 33 02 44 55 66"
        );
    }

    /// Load failures never touch the sync bookkeeping.
    #[test]
    fn failed_load_does_not_disturb_sync() {
        let mut profile = Profile::default();
        profile.current_mode_mut().lighting.fill(MOUSE_ZONES, Rgb::GREEN);
        let (mut dev, mock) = attach_mouse(profile);
        synchronize(&mut dev, false).unwrap();
        mock.corrupt_replies();

        let before = dev.last_light.clone();
        let mut scratch = before.clone();
        let result = persist::load_into(&dev, &mut scratch);
        assert!(matches!(result, Err(Error::ProtocolMismatch { .. })));
        assert_eq!(scratch, before);
        assert_eq!(dev.last_light, before);

        mock.clear_sent();
        synchronize(&mut dev, false).unwrap();
        assert_eq!(mock.sent_count(), 0);
    }

    /// Many callers on one handle are serialized: only the first sends anything.
    #[test]
    fn concurrent_syncs_on_one_handle_are_serialized() {
        let mut profile = Profile::default();
        profile.current_mode_mut().lighting.fill(MOUSE_ZONES, Rgb::RED);
        let (dev, mock) = attach_mouse(profile);
        let shared = dev.into_shared();

        let mut handles = vec![];
        for _ in 0..8 {
            let dev = Arc::clone(&shared);
            handles.push(thread::spawn(move || synchronize_shared(&dev, false)));
        }
        for h in handles {
            h.join().expect("thread panicked").unwrap();
        }

        assert_eq!(mock.sent_count(), 2);
        let dev = lock_device(&shared);
        assert_eq!(dev.last_light, dev.profile.current_mode().lighting);
    }

    /// Distinct handles proceed independently in one scheduler tick.
    #[test]
    fn scheduler_services_distinct_handles() {
        let mut scheduler = SyncScheduler::new();
        let mut mocks = vec![];
        for color in [Rgb::RED, Rgb::GREEN, Rgb::BLUE, Rgb::WHITE] {
            let mut profile = Profile::default();
            profile.current_mode_mut().lighting.fill(MOUSE_ZONES, color);
            let (dev, mock) = attach_mouse(profile);
            scheduler.attach(dev);
            mocks.push((color, mock));
        }

        let reports = scheduler.tick(false);
        assert!(reports
            .iter()
            .all(|r| matches!(r.outcome, TickOutcome::Synchronized)));

        for (color, mock) in &mocks {
            let sent = mock.sent();
            assert_eq!(sent.len(), 2);
            let bytes = sent[0].as_bytes();
            assert_eq!(&bytes[5..8], &color.to_bytes());
            assert_eq!(&bytes[9..12], &color.to_bytes());
        }
    }
}
