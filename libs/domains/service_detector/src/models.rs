use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use utoipa::ToSchema;

/// Google productivity services the assistant can act on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GoogleService {
    /// Gmail
    #[serde(alias = "gmail")]
    #[strum(to_string = "email", serialize = "gmail")]
    Email,
    Calendar,
    Tasks,
    Keep,
}

/// One flag per [`GoogleService`]; always serialized with all four keys.
///
/// Used for detector output, requested services on an OAuth state and a user's
/// granted permissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ServiceFlags {
    #[serde(alias = "gmail")]
    pub email: bool,
    pub calendar: bool,
    pub tasks: bool,
    pub keep: bool,
}

/// Detector output
pub type DetectedServices = ServiceFlags;

impl ServiceFlags {
    pub fn all() -> Self {
        Self {
            email: true,
            calendar: true,
            tasks: true,
            keep: true,
        }
    }

    pub fn get(&self, service: GoogleService) -> bool {
        match service {
            GoogleService::Email => self.email,
            GoogleService::Calendar => self.calendar,
            GoogleService::Tasks => self.tasks,
            GoogleService::Keep => self.keep,
        }
    }

    pub fn set(&mut self, service: GoogleService, value: bool) {
        match service {
            GoogleService::Email => self.email = value,
            GoogleService::Calendar => self.calendar = value,
            GoogleService::Tasks => self.tasks = value,
            GoogleService::Keep => self.keep = value,
        }
    }

    pub fn any(&self) -> bool {
        self.email || self.calendar || self.tasks || self.keep
    }

    /// Flagged services in declaration order
    pub fn services(&self) -> Vec<GoogleService> {
        GoogleService::iter().filter(|s| self.get(*s)).collect()
    }

    /// Services flagged here but not in `granted`
    pub fn missing_from(&self, granted: &ServiceFlags) -> Vec<GoogleService> {
        GoogleService::iter()
            .filter(|s| self.get(*s) && !granted.get(*s))
            .collect()
    }

    pub fn union(self, other: ServiceFlags) -> Self {
        Self {
            email: self.email || other.email,
            calendar: self.calendar || other.calendar,
            tasks: self.tasks || other.tasks,
            keep: self.keep || other.keep,
        }
    }
}

impl FromIterator<GoogleService> for ServiceFlags {
    fn from_iter<I: IntoIterator<Item = GoogleService>>(iter: I) -> Self {
        let mut flags = Self::default();
        for service in iter {
            flags.set(service, true);
        }
        flags
    }
}
