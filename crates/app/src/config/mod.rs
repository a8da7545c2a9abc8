use serde::{Deserialize, Serialize};

pub const DEFAULT_MAINTENANCE_HOUR: u32 = 2;
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Daily maintenance time, in UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MaintenanceSchedule {
    pub hour: u32,
    pub minute: u32,
    pub enabled: bool,
}

impl Default for MaintenanceSchedule {
    fn default() -> Self {
        Self {
            hour: DEFAULT_MAINTENANCE_HOUR,
            minute: 0,
            enabled: true,
        }
    }
}

impl MaintenanceSchedule {
    pub fn validate(&self) -> Result<(), String> {
        if self.hour > 23 {
            return Err(format!("maintenance hour {} out of range 0-23", self.hour));
        }
        if self.minute > 59 {
            return Err(format!(
                "maintenance minute {} out of range 0-59",
                self.minute
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct IngestSettings {
    pub queue_capacity: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}
