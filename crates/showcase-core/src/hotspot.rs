// Controller overlay hotspots
//
// Each hotspot is declared by the top-left corner of its bounding box, as
// percentages of the overlay, and a diameter relative to the screen height.
// Phones and tablets use slightly different offsets for the same artwork.

use serde::{Deserialize, Serialize};

use crate::catalog::CarId;

/// Diameter of the paddle hotspots, as a fraction of screen height.
pub const PADDLE_DIAMETER: f32 = 0.2;
/// Diameter of the button hotspots, as a fraction of screen height.
pub const BUTTON_DIAMETER: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutVariant {
    #[default]
    Phone,
    Tablet,
}

impl LayoutVariant {
    pub fn from_tablet(tablet: bool) -> Self {
        if tablet {
            LayoutVariant::Tablet
        } else {
            LayoutVariant::Phone
        }
    }
}

/// Unresolved hotspot placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotspotPlacement {
    pub id: CarId,
    pub left_pct: f32,
    pub top_pct: f32,
    pub diameter: f32,
}

fn place(id: CarId, left_pct: f32, top_pct: f32) -> HotspotPlacement {
    let diameter = if id.is_paddle() {
        PADDLE_DIAMETER
    } else {
        BUTTON_DIAMETER
    };
    HotspotPlacement {
        id,
        left_pct,
        top_pct,
        diameter,
    }
}

pub fn layout(variant: LayoutVariant) -> [HotspotPlacement; 10] {
    let tablet = variant == LayoutVariant::Tablet;
    let pick = |tablet_value: f32, phone_value: f32| if tablet { tablet_value } else { phone_value };
    [
        place(CarId::LeftPaddle, 24.0, 27.0),
        place(CarId::LeftWhite, pick(34.0, 33.5), 49.0),
        place(CarId::LeftBlue, pick(34.0, 33.0), pick(60.0, 61.0)),
        place(CarId::LeftYellow, pick(34.0, 33.0), pick(71.5, 73.0)),
        place(CarId::LeftBlack, pick(33.5, 33.0), pick(83.0, 85.0)),
        place(CarId::RightWhite, 61.0, pick(49.0, 50.0)),
        place(CarId::RightYellow, 61.0, pick(61.0, 62.0)),
        place(CarId::RightRed, 61.5, pick(72.0, 73.5)),
        place(CarId::RightGreen, 61.5, pick(83.0, 85.0)),
        place(CarId::RightPaddle, 68.0, 27.0),
    ]
}

/// A hotspot resolved to pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hotspot {
    pub id: CarId,
    pub left: f32,
    pub top: f32,
    pub diameter: f32,
}

impl Hotspot {
    pub fn center(&self) -> (f32, f32) {
        let radius = self.radius();
        (self.left + radius, self.top + radius)
    }

    pub fn radius(&self) -> f32 {
        self.diameter / 2.0
    }

    fn distance_sq(&self, x: f32, y: f32) -> f32 {
        let (cx, cy) = self.center();
        (x - cx).powi(2) + (y - cy).powi(2)
    }

    /// Circular hit test, edge inclusive.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.distance_sq(x, y) <= self.radius().powi(2)
    }
}

pub fn resolve(variant: LayoutVariant, width: f32, height: f32) -> Vec<Hotspot> {
    layout(variant)
        .into_iter()
        .map(|placement| Hotspot {
            id: placement.id,
            left: width * placement.left_pct / 100.0,
            top: height * placement.top_pct / 100.0,
            diameter: height * placement.diameter,
        })
        .collect()
}

/// The hotspot under a touch point. Overlaps go to the nearest centre.
pub fn hit_test(hotspots: &[Hotspot], x: f32, y: f32) -> Option<CarId> {
    hotspots
        .iter()
        .filter(|h| h.contains(x, y))
        .min_by(|a, b| a.distance_sq(x, y).total_cmp(&b.distance_sq(x, y)))
        .map(|h| h.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn resolve_phone_left_paddle() {
        let hotspots = resolve(LayoutVariant::Phone, 1000.0, 500.0);
        let paddle = hotspots[0];
        assert_eq!(paddle.id, CarId::LeftPaddle);
        assert_eq!(paddle.left, 240.0);
        assert_eq!(paddle.top, 135.0);
        assert_eq!(paddle.diameter, 100.0);
        assert_eq!(paddle.center(), (290.0, 185.0));
    }

    #[test]
    fn button_diameter_scales_with_height() {
        let hotspots = resolve(LayoutVariant::Phone, 2000.0, 800.0);
        let button = hotspots.iter().find(|h| h.id == CarId::RightRed).unwrap();
        assert_eq!(button.diameter, 80.0);
    }

    #[test]
    fn tablet_offsets_differ() {
        let phone = layout(LayoutVariant::Phone);
        let tablet = layout(LayoutVariant::Tablet);
        assert_eq!(phone[2].top_pct, 61.0);
        assert_eq!(tablet[2].top_pct, 60.0);
        assert_eq!(phone[0], tablet[0]);
        assert_eq!(phone[9], tablet[9]);
    }

    #[test]
    fn hit_centres_of_every_hotspot() {
        for variant in [LayoutVariant::Phone, LayoutVariant::Tablet] {
            let hotspots = resolve(variant, 1920.0, 1080.0);
            for hotspot in &hotspots {
                let (x, y) = hotspot.center();
                assert_eq!(hit_test(&hotspots, x, y), Some(hotspot.id));
            }
        }
    }

    #[test]
    fn miss_outside_all_hotspots() {
        let hotspots = resolve(LayoutVariant::Phone, 1000.0, 500.0);
        assert_eq!(hit_test(&hotspots, 0.0, 0.0), None);
        // Inside the paddle's bounding box but outside its circle.
        assert_eq!(hit_test(&hotspots, 241.0, 136.0), None);
    }

    #[test]
    fn overlap_goes_to_nearest_centre() {
        let hotspots = [
            Hotspot {
                id: CarId::LeftWhite,
                left: 0.0,
                top: 0.0,
                diameter: 10.0,
            },
            Hotspot {
                id: CarId::LeftBlue,
                left: 6.0,
                top: 0.0,
                diameter: 10.0,
            },
        ];
        assert_eq!(hit_test(&hotspots, 7.0, 5.0), Some(CarId::LeftWhite));
        assert_eq!(hit_test(&hotspots, 9.0, 5.0), Some(CarId::LeftBlue));
    }

    proptest! {
        #[test]
        fn hit_is_always_inside_the_hotspot(
            x in 0.0f32..1920.0,
            y in 0.0f32..1080.0,
            tablet in any::<bool>(),
        ) {
            let hotspots = resolve(LayoutVariant::from_tablet(tablet), 1920.0, 1080.0);
            if let Some(id) = hit_test(&hotspots, x, y) {
                let hit = hotspots.iter().find(|h| h.id == id).unwrap();
                prop_assert!(hit.contains(x, y));
            }
        }
    }
}
