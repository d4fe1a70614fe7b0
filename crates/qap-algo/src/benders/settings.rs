//! Benders decomposition configuration.

use std::fmt;

use serde::Serialize;

use crate::settings::SolveLimits;
use qap_core::{QapError, QapResult};

/// When the separation oracle is invoked by the search driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SeparationTrigger {
    /// Every new integral incumbent
    #[default]
    OnIncumbent,
    /// Every optimally-solved relaxation, then the incumbent loop
    OnOptimalNode,
}

impl fmt::Display for SeparationTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeparationTrigger::OnIncumbent => write!(f, "incumbent"),
            SeparationTrigger::OnOptimalNode => write!(f, "node"),
        }
    }
}

impl std::str::FromStr for SeparationTrigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "incumbent" | "mipsol" | "all_mipsols" => Ok(SeparationTrigger::OnIncumbent),
            "node" | "mipnode" | "all_mipnodes" => Ok(SeparationTrigger::OnOptimalNode),
            _ => Err(format!("Unknown separation trigger: {}", s)),
        }
    }
}

/// How derived cuts are injected into the master.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum CutInjectionMode {
    /// Required for exactness; the driver loops until no pair is violated
    #[default]
    Lazy,
    /// Relaxation strengthening only; exactness rests on the seeded master
    UserCut,
}

impl fmt::Display for CutInjectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CutInjectionMode::Lazy => write!(f, "lazy"),
            CutInjectionMode::UserCut => write!(f, "user-cut"),
        }
    }
}

impl std::str::FromStr for CutInjectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lazy" | "lazy_constr" => Ok(CutInjectionMode::Lazy),
            "user-cut" | "user_cut" | "cut" => Ok(CutInjectionMode::UserCut),
            _ => Err(format!("Unknown cut injection mode: {}", s)),
        }
    }
}

/// Full configuration of one decomposition run.
#[derive(Debug, Clone, Serialize)]
pub struct BendersSettings {
    /// Binary X (exact search) or the [0,1] relaxation
    pub x_is_bin: bool,
    /// Seed the master with the Kaufman-Broeckx big-M bounds on W
    pub init_with_kbl: bool,
    /// Alternate warm start; configured but unimplemented, rejected at
    /// construction
    pub init_with_xy: bool,
    pub trigger: SeparationTrigger,
    pub cut_mode: CutInjectionMode,
    /// A pair is cut only when `w_hat[i,j] < w_bar[i,j] - minimum_w_difference`
    pub minimum_w_difference: f64,
    pub limits: SolveLimits,
}

impl Default for BendersSettings {
    fn default() -> Self {
        Self {
            x_is_bin: true,
            init_with_kbl: true,
            init_with_xy: false,
            trigger: SeparationTrigger::default(),
            cut_mode: CutInjectionMode::default(),
            minimum_w_difference: 0.0,
            limits: SolveLimits::default(),
        }
    }
}

impl BendersSettings {
    /// Full configuration check; any error here is fatal before any solve.
    pub fn validate(&self) -> QapResult<()> {
        if self.minimum_w_difference < 0.0 {
            return Err(QapError::Config(format!(
                "minimum Benders cut violation must not be negative, got {}",
                self.minimum_w_difference
            )));
        }
        self.limits.validate()?;
        if self.init_with_xy {
            return Err(QapError::NotImplemented(
                "init_with_xy warm start is not implemented".into(),
            ));
        }
        if self.cut_mode == CutInjectionMode::UserCut {
            if !self.init_with_kbl {
                return Err(QapError::Config(
                    "user-cut injection keeps the master exact only with the \
                     Kaufman-Broeckx seed; enable init_with_kbl"
                        .into(),
                ));
            }
            if self.trigger == SeparationTrigger::OnIncumbent {
                return Err(QapError::Config(
                    "user cuts can only be injected at relaxation checkpoints; \
                     use the node trigger"
                        .into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(BendersSettings::default().validate().is_ok());
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let settings = BendersSettings {
            minimum_w_difference: -1e-9,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(QapError::Config(_))));
    }

    #[test]
    fn test_xy_warm_start_fails_fast() {
        let settings = BendersSettings {
            init_with_xy: true,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(QapError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_bad_limits_propagate() {
        let settings = BendersSettings {
            limits: SolveLimits {
                time_limit: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(QapError::Config(_))));
    }

    #[test]
    fn test_user_cut_combinations() {
        let bare = BendersSettings {
            cut_mode: CutInjectionMode::UserCut,
            trigger: SeparationTrigger::OnOptimalNode,
            init_with_kbl: false,
            ..Default::default()
        };
        assert!(matches!(bare.validate(), Err(QapError::Config(_))));

        let on_incumbent = BendersSettings {
            cut_mode: CutInjectionMode::UserCut,
            trigger: SeparationTrigger::OnIncumbent,
            ..Default::default()
        };
        assert!(matches!(on_incumbent.validate(), Err(QapError::Config(_))));

        let ok = BendersSettings {
            cut_mode: CutInjectionMode::UserCut,
            trigger: SeparationTrigger::OnOptimalNode,
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_enum_round_trips() {
        assert_eq!(
            "all_mipsols".parse::<SeparationTrigger>().unwrap(),
            SeparationTrigger::OnIncumbent
        );
        assert_eq!(
            "node".parse::<SeparationTrigger>().unwrap(),
            SeparationTrigger::OnOptimalNode
        );
        assert_eq!(
            "lazy_constr".parse::<CutInjectionMode>().unwrap(),
            CutInjectionMode::Lazy
        );
        assert!("sometimes".parse::<SeparationTrigger>().is_err());
        assert!("soft".parse::<CutInjectionMode>().is_err());
    }
}
