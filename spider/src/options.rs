use serde::{Deserialize, Serialize};

use crate::gait::Gait;
use crate::plan::BodyPlan;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugOptions {
    /// Leave chains in their straightened pose instead of solving toward the foot.
    pub disable_fabrik: bool,
}

/// Everything needed to build a creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiderOptions {
    pub walk_gait: Gait,
    pub gallop_gait: Gait,
    pub body_plan: BodyPlan,
    pub debug: DebugOptions,
}

impl Default for SpiderOptions {
    fn default() -> Self {
        Self {
            walk_gait: Gait::default_walk(),
            gallop_gait: Gait::default_gallop(),
            body_plan: BodyPlan::default(),
            debug: DebugOptions::default(),
        }
    }
}

impl SpiderOptions {
    pub fn with_body_plan(body_plan: BodyPlan) -> Self {
        Self { body_plan, ..Self::default() }
    }

    /// Scales both gaits and the body plan together.
    pub fn scale(&mut self, factor: f64) {
        self.walk_gait.scale(factor);
        self.gallop_gait.scale(factor);
        self.body_plan.scale(factor);
    }

    pub fn gait(&self, gallop: bool) -> &Gait {
        if gallop { &self.gallop_gait } else { &self.walk_gait }
    }
}
