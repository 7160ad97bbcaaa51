use crate::detail::Detail;
use crate::detail::Kind;
use crate::Size;

/// The closed set of observation points in a placement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    BeforeLrpCut,
    AfterLrpCut,
    AfterDetailPlaced,
    End,
}

/// Snapshot of the engine at emission time: configuration, state scalars,
/// the size being placed, and the placement list by reference.
#[derive(Debug)]
pub struct Context<'a> {
    pub gamma: f64,
    pub n0: usize,
    pub max_placed: usize,
    pub lrp: &'a Detail,
    pub active_box: Option<&'a Detail>,
    pub active_box_first_detail_index: usize,
    pub is_active_box_horizontal: bool,
    pub last_placed_index: usize,
    pub endpoints_placed: usize,
    pub active_box_from: Option<Kind>,
    pub size: Size,
    pub placed: &'a [Detail],
}

/// The three rectangles one placement cuts out of the active box.
#[derive(Debug)]
pub struct Placement<'a> {
    pub detail: &'a Detail,
    pub normal_box: &'a Detail,
    pub endpoint: &'a Detail,
}

/// A lifecycle observation. Events for one detail arrive in a fixed order:
/// before-cut and after-cut bracket a stripe cut when one happens, every
/// successful placement emits after-placed, and the final placement is
/// followed by end.
#[derive(Debug)]
pub enum Event<'a> {
    BeforeLrpCut(Context<'a>),
    AfterLrpCut(Context<'a>),
    AfterDetailPlaced(Context<'a>, Placement<'a>),
    End(Context<'a>),
}

impl<'a> Event<'a> {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::BeforeLrpCut(_) => EventKind::BeforeLrpCut,
            Self::AfterLrpCut(_) => EventKind::AfterLrpCut,
            Self::AfterDetailPlaced(_, _) => EventKind::AfterDetailPlaced,
            Self::End(_) => EventKind::End,
        }
    }

    pub fn context(&self) -> &Context<'a> {
        match self {
            Self::BeforeLrpCut(context) => context,
            Self::AfterLrpCut(context) => context,
            Self::AfterDetailPlaced(context, _) => context,
            Self::End(context) => context,
        }
    }
}
