use crate::algorithm::PackError;
use crate::Coord;
use serde::Deserialize;
use serde::Serialize;

/// Classification of a rectangle in the cutting lifecycle.
///
/// `Detail` rectangles are terminal. `NormalBox*` rectangles sit in box
/// storage until reused. `Endpoint*` rectangles are the trailing remainder
/// of an active box and become the next active box directly. `Lrp` is the
/// one uncut piece of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    #[serde(rename = "detail")]
    Detail,
    #[serde(rename = "normal_box_1")]
    NormalBox1,
    #[serde(rename = "normal_box_2")]
    NormalBox2,
    #[serde(rename = "endpoint_1")]
    Endpoint1,
    #[serde(rename = "endpoint_2")]
    Endpoint2,
    #[serde(rename = "lrp")]
    Lrp,
}

impl Kind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Detail => "detail",
            Self::NormalBox1 => "normal_box_1",
            Self::NormalBox2 => "normal_box_2",
            Self::Endpoint1 => "endpoint_1",
            Self::Endpoint2 => "endpoint_2",
            Self::Lrp => "lrp",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Kind {
    type Err = PackError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "detail" => Ok(Self::Detail),
            "normal_box_1" => Ok(Self::NormalBox1),
            "normal_box_2" => Ok(Self::NormalBox2),
            "endpoint_1" => Ok(Self::Endpoint1),
            "endpoint_2" => Ok(Self::Endpoint2),
            "lrp" => Ok(Self::Lrp),
            other => Err(PackError::UnknownKind(other.to_string())),
        }
    }
}

/// An axis-aligned rectangle on the sheet.
///
/// Immutable once created: every cut produces fresh rectangles, nothing is
/// ever resized in place. Coordinates are compared bitwise when a rectangle
/// is looked up in the placement list, which is safe because rectangles are
/// only ever re-referenced, never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    pub bottom_left: (Coord, Coord),
    pub top_right: (Coord, Coord),
    pub name: String,
    pub detail_type: Kind,
}

impl Detail {
    pub fn new(
        bottom_left: (Coord, Coord),
        top_right: (Coord, Coord),
        name: impl Into<String>,
        detail_type: Kind,
    ) -> Self {
        Self {
            bottom_left,
            top_right,
            name: name.into(),
            detail_type,
        }
    }

    pub fn width(&self) -> Coord {
        self.top_right.0 - self.bottom_left.0
    }

    pub fn height(&self) -> Coord {
        self.top_right.1 - self.bottom_left.1
    }

    /// the shorter side, the priority key of box storage
    pub fn min_side(&self) -> Coord {
        self.width().min(self.height())
    }

    pub fn area(&self) -> Coord {
        self.width() * self.height()
    }

    /// whether the two rectangles share at least a boundary point
    pub fn touches(&self, other: &Self) -> bool {
        self.bottom_left.0 <= other.top_right.0
            && self.top_right.0 >= other.bottom_left.0
            && self.bottom_left.1 <= other.top_right.1
            && self.top_right.1 >= other.bottom_left.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_accessors() {
        let d = Detail::new((1.0, 2.0), (4.0, 3.5), "D1", Kind::Detail);
        assert!(d.width() == 3.0);
        assert!(d.height() == 1.5);
        assert!(d.min_side() == 1.5);
        assert!(d.area() == 4.5);
    }

    #[test]
    fn kind_strings_round_trip() {
        for kind in [
            Kind::Detail,
            Kind::NormalBox1,
            Kind::NormalBox2,
            Kind::Endpoint1,
            Kind::Endpoint2,
            Kind::Lrp,
        ] {
            assert!(kind.as_str().parse::<Kind>().unwrap() == kind);
        }
        assert!("stripe".parse::<Kind>().is_err());
    }

    #[test]
    fn json_shape_is_stable() {
        let d = Detail::new((0.0, 0.0), (0.5, 1.0), "B7", Kind::NormalBox1);
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"bottom_left\":[0.0,0.0]"));
        assert!(json.contains("\"detail_type\":\"normal_box_1\""));
        let back: Detail = serde_json::from_str(&json).unwrap();
        assert!(back == d);
    }

    #[test]
    fn touching_rectangles_are_neighbours() {
        let a = Detail::new((0.0, 0.0), (1.0, 1.0), "a", Kind::Detail);
        let b = Detail::new((1.0, 0.0), (2.0, 1.0), "b", Kind::Detail);
        let c = Detail::new((1.5, 3.0), (2.0, 4.0), "c", Kind::Detail);
        assert!(a.touches(&b));
        assert!(b.touches(&a));
        assert!(!a.touches(&c));
    }
}
