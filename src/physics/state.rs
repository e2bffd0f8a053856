use crate::config::ForceParams;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No ticks scheduled.
    Idle,
    Running,
    /// Alpha dropped below `alpha_min` on the last tick.
    Settled,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Settled => "settled",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationState {
    pub alpha: f32,
    pub alpha_target: f32,
    pub alpha_decay: f32,
    pub alpha_min: f32,
    phase: Phase,
}

impl SimulationState {
    /// Cold start: full energy, decaying to rest.
    pub fn new(params: &ForceParams) -> Self {
        Self {
            alpha: 1.0,
            alpha_target: 0.0,
            alpha_decay: params.alpha_decay(),
            alpha_min: params.alpha_min,
            phase: Phase::Running,
        }
    }

    pub fn idle(params: &ForceParams) -> Self {
        Self {
            alpha: 0.0,
            phase: Phase::Idle,
            ..Self::new(params)
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub(super) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Raises the target and resumes ticking if the simulation had stopped.
    pub fn reheat(&mut self, alpha_target: f32) {
        self.alpha_target = alpha_target.clamp(0.0, 1.0);
        self.phase = Phase::Running;
    }

    /// Lets alpha decay back to rest.
    pub fn cool(&mut self) {
        self.alpha_target = 0.0;
    }

    /// Bumps alpha itself, for parameter changes that invalidate the layout.
    pub fn restart(&mut self, alpha: f32) {
        self.alpha = self.alpha.max(alpha.clamp(0.0, 1.0));
        self.phase = Phase::Running;
    }

    pub(super) fn decay(&mut self) -> f32 {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        self.alpha
    }
}
