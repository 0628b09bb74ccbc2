/// Arena geometry and spawn parameters
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct ArenaConfig {
    /// Vertical walls sit at y = 0 and y = height
    pub height: f64,
    pub ball_start_x: f64,
    pub ball_start_y: f64,
    pub ball_vx: f64,
    pub ball_vy: f64,
    /// Paddle offset given to a participant on join
    pub paddle_start_y: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            height: 400.0,
            ball_start_x: 300.0,
            ball_start_y: 200.0,
            ball_vx: 3.0,
            ball_vy: 3.0,
            paddle_start_y: 150.0,
        }
    }
}

impl ArenaConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err("height must be finite and > 0".to_string());
        }
        if !self.ball_start_y.is_finite()
            || self.ball_start_y <= 0.0
            || self.ball_start_y >= self.height
        {
            return Err("ball_start_y must lie strictly between the walls".to_string());
        }
        if !self.ball_start_x.is_finite() {
            return Err("ball_start_x must be finite".to_string());
        }
        if !self.ball_vx.is_finite() || !self.ball_vy.is_finite() {
            return Err("ball velocity must be finite".to_string());
        }
        if !self.paddle_start_y.is_finite() {
            return Err("paddle_start_y must be finite".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_arena_config_is_valid() {
        assert!(ArenaConfig::default().validate().is_ok());
    }

    #[test]
    fn ball_spawn_outside_walls_invalid() {
        let config = ArenaConfig {
            ball_start_y: 400.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_finite_velocity_invalid() {
        let config = ArenaConfig {
            ball_vy: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_height_invalid() {
        let config = ArenaConfig {
            height: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
