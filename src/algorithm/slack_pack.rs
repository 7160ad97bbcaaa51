use crate::algorithm::PackError;
use crate::detail::Detail;
use crate::detail::Kind;
use crate::statistic::notify_all;
use crate::statistic::Context;
use crate::statistic::Event;
use crate::statistic::Listener;
use crate::statistic::Placement;
use crate::storage::BoxStorage;
use crate::Size;

pub const DETAIL_PREFIX: &str = "D";
pub const NORMAL_BOX_PREFIX: &str = "B";
pub const ENDPOINT_PREFIX: &str = "E";
pub const LRP_NAME: &str = "LRP";

/// Scalar state of the placement machine, kept apart from storage and
/// listeners so event contexts can borrow it during dispatch.
struct State {
    gamma: f64,
    n0: usize,
    max_placed: usize,
    update_placements: bool,
    lrp: Option<Detail>,
    active_box: Option<Detail>,
    active_box_first_detail_index: usize,
    is_active_box_horizontal: bool,
    last_placed_index: usize,
    endpoints_placed: usize,
    active_box_from: Option<Kind>,
}

/// The three rectangles one placement cuts out of the active box.
struct Pieces {
    detail: Detail,
    normal_box: Detail,
    endpoint: Detail,
}

impl State {
    /// the mandatory free margin (1/k)^gamma before each placement, where k
    /// is the enclosing box's first-detail index
    fn required_gap(&self, index: usize) -> f64 {
        (1.0 / index as f64).powf(self.gamma)
    }

    /// On the first call the head of the placement list, the empty sheet,
    /// becomes the LRP.
    fn adopt_sheet(&mut self, placed: &[Detail]) -> Result<(), PackError> {
        if self.lrp.is_none() {
            self.lrp = Some(placed.first().cloned().ok_or_else(|| {
                PackError::InvalidConfiguration(
                    "placement list must be seeded with the sheet".to_string(),
                )
            })?);
        }
        Ok(())
    }

    fn lrp(&self) -> &Detail {
        self.lrp.as_ref().expect("sheet adopted before any geometry")
    }

    /// Drop the active box when the next detail cannot fit along its major
    /// axis with the slack gap. The remainder is an endpoint; endpoints
    /// never re-enter storage.
    fn retire_active_box(&mut self, size: Size) {
        if let Some(active) = self.active_box.as_ref() {
            let gap = self.required_gap(self.active_box_first_detail_index);
            let length = match self.is_active_box_horizontal {
                true => active.width(),
                false => active.height(),
            };
            if size.0 + gap > length {
                self.active_box = None;
                self.endpoints_placed += 1;
            }
        }
    }

    fn adopt_stored_box(&mut self, reused: Detail) {
        self.active_box_from = Some(reused.detail_type);
        self.is_active_box_horizontal = reused.width() >= reused.height();
        self.active_box = Some(reused);
    }

    /// Slice a stripe off the LRP along its long axis: from the bottom when
    /// the LRP is tall, from the right edge when it is wide. The stripe
    /// becomes the active box, the rest stays the LRP.
    fn cut_stripe(&mut self, size: Size, placed: &mut Vec<Detail>) -> Result<(), PackError> {
        let lrp = self.lrp().clone();
        self.active_box_from = Some(lrp.detail_type);
        let gap = self.required_gap(self.last_placed_index + 1);
        if size.1 + gap > lrp.width().max(lrp.height())
            || size.0 + gap > lrp.width().min(lrp.height())
        {
            return Err(PackError::LrpTooSmall);
        }
        let (active, rest) = match lrp.width() <= lrp.height() {
            true => {
                self.is_active_box_horizontal = true;
                let active = Detail::new(
                    lrp.bottom_left,
                    (lrp.top_right.0, lrp.bottom_left.1 + size.1 + gap),
                    format!("{}{}", ENDPOINT_PREFIX, self.endpoints_placed),
                    Kind::Endpoint1,
                );
                let rest = Detail::new(
                    (lrp.bottom_left.0, lrp.bottom_left.1 + size.1 + gap),
                    lrp.top_right,
                    LRP_NAME,
                    Kind::Lrp,
                );
                (active, rest)
            }
            false => {
                self.is_active_box_horizontal = false;
                let active = Detail::new(
                    (lrp.top_right.0 - size.1 - gap, lrp.bottom_left.1),
                    lrp.top_right,
                    format!("{}{}", ENDPOINT_PREFIX, self.endpoints_placed),
                    Kind::Endpoint1,
                );
                let rest = Detail::new(
                    lrp.bottom_left,
                    (lrp.top_right.0 - size.1 - gap, lrp.top_right.1),
                    LRP_NAME,
                    Kind::Lrp,
                );
                (active, rest)
            }
        };
        if self.update_placements {
            if let Some(at) = placed.iter().position(|d| *d == lrp) {
                placed.remove(at);
            }
            placed.push(active.clone());
            placed.push(rest.clone());
        }
        self.active_box = Some(active);
        self.lrp = Some(rest);
        Ok(())
    }

    /// Cut the active box into the placed detail, the normal box across the
    /// minor axis, and the trailing endpoint, which immediately becomes the
    /// next active box.
    fn place(&mut self, size: Size, placed: &mut Vec<Detail>) -> Pieces {
        let normal_kind = match self.active_box_from {
            Some(Kind::Lrp) => Kind::NormalBox1,
            _ => Kind::NormalBox2,
        };
        let endpoint_kind = match self.active_box_from {
            Some(Kind::Lrp) | Some(Kind::Endpoint1) => Kind::Endpoint1,
            _ => Kind::Endpoint2,
        };
        self.last_placed_index += 1;
        let active = self
            .active_box
            .take()
            .expect("active box chosen before placement");
        let (detail, normal_box, endpoint) = match self.is_active_box_horizontal {
            // cut proceeds left to right from the active box's start corner
            true => (
                Detail::new(
                    active.bottom_left,
                    (active.bottom_left.0 + size.0, active.bottom_left.1 + size.1),
                    format!("{}{}", DETAIL_PREFIX, self.last_placed_index),
                    Kind::Detail,
                ),
                Detail::new(
                    (active.bottom_left.0, active.bottom_left.1 + size.1),
                    (active.bottom_left.0 + size.0, active.top_right.1),
                    format!("{}{}", NORMAL_BOX_PREFIX, self.last_placed_index),
                    normal_kind,
                ),
                Detail::new(
                    (active.bottom_left.0 + size.0, active.bottom_left.1),
                    active.top_right,
                    format!("{}{}", ENDPOINT_PREFIX, self.endpoints_placed),
                    endpoint_kind,
                ),
            ),
            // cut proceeds bottom to top along the right edge, the detail
            // rotated so its longer side runs vertically
            false => (
                Detail::new(
                    (active.top_right.0 - size.1, active.bottom_left.1),
                    (active.top_right.0, active.bottom_left.1 + size.0),
                    format!("{}{}", DETAIL_PREFIX, self.last_placed_index),
                    Kind::Detail,
                ),
                Detail::new(
                    active.bottom_left,
                    (active.top_right.0 - size.1, active.bottom_left.1 + size.0),
                    format!("{}{}", NORMAL_BOX_PREFIX, self.last_placed_index),
                    normal_kind,
                ),
                Detail::new(
                    (active.bottom_left.0, active.bottom_left.1 + size.0),
                    active.top_right,
                    format!("{}{}", ENDPOINT_PREFIX, self.endpoints_placed),
                    endpoint_kind,
                ),
            ),
        };
        if self.update_placements {
            if let Some(at) = placed.iter().position(|d| *d == active) {
                placed.remove(at);
            }
            placed.push(detail.clone());
            placed.push(normal_box.clone());
            placed.push(endpoint.clone());
        }
        self.active_box = Some(endpoint.clone());
        Pieces {
            detail,
            normal_box,
            endpoint,
        }
    }

    fn context<'a>(&'a self, size: Size, placed: &'a [Detail]) -> Context<'a> {
        Context {
            gamma: self.gamma,
            n0: self.n0,
            max_placed: self.max_placed,
            lrp: self.lrp(),
            active_box: self.active_box.as_ref(),
            active_box_first_detail_index: self.active_box_first_detail_index,
            is_active_box_horizontal: self.is_active_box_horizontal,
            last_placed_index: self.last_placed_index,
            endpoints_placed: self.endpoints_placed,
            active_box_from: self.active_box_from,
            size,
            placed,
        }
    }
}

/// The Slack-Pack placement machine.
///
/// One `place_next` call consumes one detail size and is atomic from the
/// caller's viewpoint: it retires an exhausted active box, chooses or cuts
/// a new one, places the detail, and notifies listeners, in that order.
pub struct SlackPack<S> {
    state: State,
    storage: S,
    listeners: Vec<Box<dyn Listener>>,
}

impl<S: BoxStorage> SlackPack<S> {
    pub fn new(gamma: f64, n0: usize, max_placed: usize, storage: S) -> Result<Self, PackError> {
        if gamma <= 0.0 {
            return Err(PackError::InvalidConfiguration(
                "gamma must be positive".to_string(),
            ));
        }
        if n0 == 0 {
            return Err(PackError::InvalidConfiguration(
                "n0 must be a positive integer".to_string(),
            ));
        }
        Ok(Self {
            state: State {
                gamma,
                n0,
                max_placed,
                update_placements: true,
                lrp: None,
                active_box: None,
                active_box_first_detail_index: n0 - 1,
                is_active_box_horizontal: false,
                last_placed_index: n0 - 1,
                endpoints_placed: 1,
                active_box_from: None,
            },
            storage,
            listeners: Vec::new(),
        })
    }

    pub fn with_listeners(mut self, listeners: Vec<Box<dyn Listener>>) -> Self {
        self.listeners = listeners;
        self
    }

    /// With the flag off the engine keeps its own state and storage current
    /// but leaves the placement list untouched, for runs where the list
    /// itself would be prohibitively large.
    pub fn with_update_placements(mut self, update: bool) -> Self {
        self.state.update_placements = update;
        self
    }

    pub fn last_placed_index(&self) -> usize {
        self.state.last_placed_index
    }

    pub fn endpoints_placed(&self) -> usize {
        self.state.endpoints_placed
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Place one detail of the given size; width is the side the detail is
    /// laid along.
    pub async fn place_next(
        &mut self,
        size: Size,
        placed: &mut Vec<Detail>,
    ) -> Result<(), PackError> {
        self.state.adopt_sheet(placed)?;
        self.state.retire_active_box(size);
        self.choose_active_box(size, placed).await?;
        self.place_in_active_box(size, placed).await
    }

    /// Reuse the largest stored box when the detail fits it with slack,
    /// otherwise cut a fresh stripe. Reusing the largest box first keeps
    /// the LRP residue at least as large as anything in storage.
    async fn choose_active_box(
        &mut self,
        size: Size,
        placed: &mut Vec<Detail>,
    ) -> Result<(), PackError> {
        if self.state.active_box.is_some() {
            return Ok(());
        }
        self.state.active_box_first_detail_index = self.state.last_placed_index + 1;
        let gap = self
            .state
            .required_gap(self.state.active_box_first_detail_index);
        let largest = self
            .storage
            .peek_max()
            .await?
            .map(|b| b.min_side())
            .unwrap_or(f64::NEG_INFINITY);
        if size.1 + gap <= largest {
            let reused = self
                .storage
                .pop_max()
                .await?
                .expect("peeked box still stored");
            self.state.adopt_stored_box(reused);
        } else {
            notify_all(
                &mut self.listeners,
                &Event::BeforeLrpCut(self.state.context(size, placed)),
            );
            self.state.cut_stripe(size, placed)?;
            notify_all(
                &mut self.listeners,
                &Event::AfterLrpCut(self.state.context(size, placed)),
            );
        }
        Ok(())
    }

    async fn place_in_active_box(
        &mut self,
        size: Size,
        placed: &mut Vec<Detail>,
    ) -> Result<(), PackError> {
        let pieces = self.state.place(size, placed);
        self.storage.add(pieces.normal_box.clone()).await?;
        notify_all(
            &mut self.listeners,
            &Event::AfterDetailPlaced(
                self.state.context(size, placed),
                Placement {
                    detail: &pieces.detail,
                    normal_box: &pieces.normal_box,
                    endpoint: &pieces.endpoint,
                },
            ),
        );
        if self.state.last_placed_index == self.state.n0 + self.state.max_placed - 1 {
            notify_all(
                &mut self.listeners,
                &Event::End(self.state.context(size, placed)),
            );
        }
        Ok(())
    }
}
