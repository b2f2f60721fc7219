use egui::{Pos2, Vec2};

/// Average position of the first two contacts, or `None` with fewer than two.
pub fn two_finger_centroid(contacts: &[Pos2]) -> Option<Pos2> {
    match contacts {
        [a, b, ..] => Some(Pos2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)),
        _ => None,
    }
}

/// Tracks a two-finger pan by following the contact centroid between updates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TouchPan {
    last_centroid: Option<Pos2>,
}

impl TouchPan {
    pub fn is_active(&self) -> bool {
        self.last_centroid.is_some()
    }

    /// Starts tracking at the contacts' centroid. Returns `false` with fewer than two contacts.
    pub fn begin(&mut self, contacts: &[Pos2]) -> bool {
        self.last_centroid = two_finger_centroid(contacts);
        self.last_centroid.is_some()
    }

    /// Screen delta since the previous update. Ends the pan once a finger lifts.
    pub fn update(&mut self, contacts: &[Pos2]) -> Option<Vec2> {
        let Some(centroid) = two_finger_centroid(contacts) else {
            self.last_centroid = None;
            return None;
        };
        let delta = self.last_centroid.map(|last| centroid - last);
        self.last_centroid = Some(centroid);
        delta
    }

    pub fn end(&mut self) {
        self.last_centroid = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    #[test]
    fn centroid_of_two_contacts() {
        assert_eq!(
            two_finger_centroid(&[pos2(0.0, 0.0), pos2(10.0, 20.0)]),
            Some(pos2(5.0, 10.0))
        );
        assert_eq!(two_finger_centroid(&[pos2(1.0, 1.0)]), None);
    }

    #[test]
    fn pan_follows_centroid() {
        let mut pan = TouchPan::default();
        assert!(pan.begin(&[pos2(0.0, 0.0), pos2(10.0, 0.0)]));
        let delta = pan.update(&[pos2(4.0, 6.0), pos2(14.0, 6.0)]);
        assert_eq!(delta, Some(vec2(4.0, 6.0)));
        assert_eq!(pan.update(&[pos2(4.0, 6.0)]), None);
        assert!(!pan.is_active());
    }
}
