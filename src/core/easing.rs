//! Easing curves.  Only the handful the stage actually uses.

/// Maps linear progress `t ∈ [0, 1]` to eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Quadratic ease-in.
    Power2In,
    /// Quadratic ease-out.
    #[default]
    Power2Out,
    Power2InOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Power2In => t * t,
            Easing::Power2Out => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::Power2InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t) * (1.0 - t)
                }
            }
        }
    }
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curves_hit_endpoints() {
        for e in [
            Easing::Linear,
            Easing::Power2In,
            Easing::Power2Out,
            Easing::Power2InOut,
        ] {
            assert_eq!(e.apply(0.0), 0.0, "{e:?}");
            assert_eq!(e.apply(1.0), 1.0, "{e:?}");
            assert_eq!(e.apply(3.0), 1.0, "{e:?}");
        }
    }

    #[test]
    fn out_leads_in() {
        assert!(Easing::Power2Out.apply(0.3) > Easing::Linear.apply(0.3));
        assert!(Easing::Power2In.apply(0.3) < Easing::Linear.apply(0.3));
    }
}
