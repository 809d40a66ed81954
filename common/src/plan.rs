use std::{fmt, str::FromStr};

use crate::error::AppError;

/// Subscription tier of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Plan {
    #[default]
    Basic,
    Pro,
    Illimite,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Basic, Plan::Pro, Plan::Illimite];

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Basic => "basic",
            Plan::Pro => "pro",
            Plan::Illimite => "illimite",
        }
    }

    /// Decodes a plan read back from storage. Anything unrecognised falls back to basic.
    pub fn from_stored(value: &str) -> Plan {
        value.parse().unwrap_or_else(|_| {
            log::warn!("Unknown stored plan '{}', treating it as basic", value);
            Plan::Basic
        })
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" | "basique" => Ok(Plan::Basic),
            "pro" => Ok(Plan::Pro),
            "illimite" | "illimité" | "unlimited" => Ok(Plan::Illimite),
            other => Err(AppError::BadRequest(format!("Unknown plan: {}", other))),
        }
    }
}

/// Monthly message quota per plan. `None` means the plan has no cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanLimits {
    pub basic: Option<u64>,
    pub pro: Option<u64>,
    pub illimite: Option<u64>,
}

impl Default for PlanLimits {
    fn default() -> Self {
        PlanLimits {
            basic: Some(100),
            pro: Some(1000),
            illimite: None,
        }
    }
}

impl PlanLimits {
    pub fn limit_for(&self, plan: Plan) -> Option<u64> {
        match plan {
            Plan::Basic => self.basic,
            Plan::Pro => self.pro,
            Plan::Illimite => self.illimite,
        }
    }
}
