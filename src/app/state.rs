//! Shared device state: the single source of truth for every toggle-able
//! device on the site.
//!
//! `DeviceState` is plain data plus invariant-preserving mutators. It never
//! touches hardware and is never shared directly: the
//! [`Controller`](super::service::Controller) owns the only instance and
//! serializes every access through its lock.

use super::events::Snapshot;

/// Number of zone lights. The last zone is the outside light.
pub const ZONE_COUNT: usize = 8;

/// Index of the outside light, which the alarm policy also drives.
pub const OUTSIDE_ZONE: usize = ZONE_COUNT - 1;

/// One switchable light zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneLight {
    pub name: String,
    pub on: bool,
}

/// Alarm flags. `triggered` implies `armed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlarmFlags {
    pub armed: bool,
    pub triggered: bool,
}

/// Result of a people-count adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountChange {
    pub before: u32,
    pub after: u32,
}

impl CountChange {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    zones: [ZoneLight; ZONE_COUNT],
    /// Outside light held on by the policy because it is dark.
    outside_auto: bool,
    servo_engaged: bool,
    /// Bumped on every servo toggle so a stale release can be recognized.
    servo_pulse_seq: u64,
    rc_active: bool,
    people_count: u32,
    alarm: AlarmFlags,
}

impl DeviceState {
    /// Everything off, count zero, alarm disarmed.
    pub fn new(zone_names: &[String; ZONE_COUNT]) -> Self {
        Self {
            zones: core::array::from_fn(|i| ZoneLight {
                name: zone_names[i].clone(),
                on: false,
            }),
            outside_auto: false,
            servo_engaged: false,
            servo_pulse_seq: 0,
            rc_active: false,
            people_count: 0,
            alarm: AlarmFlags::default(),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// The connect-time view sent to every new observer.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            initial_states: core::array::from_fn(|i| self.zones[i].on),
            servo_state: self.servo_engaged,
            people_count: self.people_count,
            rc_motor_state: self.rc_active,
        }
    }

    pub fn zone(&self, index: usize) -> Option<&ZoneLight> {
        self.zones.get(index)
    }

    pub fn outside_auto(&self) -> bool {
        self.outside_auto
    }

    pub fn servo_engaged(&self) -> bool {
        self.servo_engaged
    }

    pub fn servo_pulse_seq(&self) -> u64 {
        self.servo_pulse_seq
    }

    pub fn rc_active(&self) -> bool {
        self.rc_active
    }

    pub fn people_count(&self) -> u32 {
        self.people_count
    }

    pub fn alarm(&self) -> AlarmFlags {
        self.alarm
    }

    // ── Mutators ──────────────────────────────────────────────

    /// Flip one zone. Returns the new level, or `None` when out of range.
    pub fn toggle_zone(&mut self, index: usize) -> Option<bool> {
        let zone = self.zones.get_mut(index)?;
        zone.on = !zone.on;
        Some(zone.on)
    }

    /// Policy-driven outside light. Returns `true` if anything changed.
    pub fn set_outside_auto(&mut self, on: bool) -> bool {
        let changed = self.outside_auto != on || self.zones[OUTSIDE_ZONE].on != on;
        self.outside_auto = on;
        self.zones[OUTSIDE_ZONE].on = on;
        changed
    }

    /// Flip the barrier. Returns the new position and the pulse sequence
    /// number that owns the release.
    pub fn toggle_servo(&mut self) -> (bool, u64) {
        self.servo_engaged = !self.servo_engaged;
        self.servo_pulse_seq = self.servo_pulse_seq.wrapping_add(1);
        (self.servo_engaged, self.servo_pulse_seq)
    }

    pub fn toggle_rc(&mut self) -> bool {
        self.rc_active = !self.rc_active;
        self.rc_active
    }

    /// Apply `delta`, clamping at zero.
    pub fn adjust_people_count(&mut self, delta: i32) -> CountChange {
        let before = self.people_count;
        let after = (i64::from(before) + i64::from(delta)).clamp(0, i64::from(u32::MAX)) as u32;
        self.people_count = after;
        CountChange { before, after }
    }

    /// Arm the alarm. Returns `true` if it was disarmed before.
    pub fn arm(&mut self) -> bool {
        let changed = !self.alarm.armed;
        self.alarm.armed = true;
        changed
    }

    /// Disarm, which also clears a trigger. Returns the flags held before.
    pub fn disarm(&mut self) -> AlarmFlags {
        let before = self.alarm;
        self.alarm = AlarmFlags::default();
        before
    }

    /// Latch the trigger. Refused (returns `false`) while disarmed; also
    /// `false` when already triggered.
    pub fn trigger(&mut self) -> bool {
        if !self.alarm.armed || self.alarm.triggered {
            return false;
        }
        self.alarm.triggered = true;
        true
    }
}
