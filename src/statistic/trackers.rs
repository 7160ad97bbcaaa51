use crate::detail::Kind;
use crate::statistic::Event;
use crate::statistic::EventKind;
use crate::statistic::Listener;
use crate::statistic::Output;
use std::time::Instant;

/// Progress line every n-th placed detail.
pub struct PrintEachN {
    n: usize,
    out: Box<dyn Output>,
}

impl PrintEachN {
    pub fn new(n: usize, out: Box<dyn Output>) -> Self {
        Self { n, out }
    }
}

impl Listener for PrintEachN {
    fn subscribes(&self) -> EventKind {
        EventKind::AfterDetailPlaced
    }
    fn notify(&mut self, event: &Event<'_>) {
        let context = event.context();
        if context.last_placed_index % self.n == 0 {
            self.out.write(&format!(
                "Placed detail with index {}",
                context.last_placed_index
            ));
        }
    }
}

/// End-of-run banner.
pub struct PrintInfoAtEnd {
    out: Box<dyn Output>,
}

impl PrintInfoAtEnd {
    pub fn new(out: Box<dyn Output>) -> Self {
        Self { out }
    }
}

impl Listener for PrintInfoAtEnd {
    fn subscribes(&self) -> EventKind {
        EventKind::End
    }
    fn notify(&mut self, event: &Event<'_>) {
        let context = event.context();
        self.out.write(&format!(
            "Slack Pack algorithm with n0 = {} and gamma = {} ended",
            context.n0, context.gamma
        ));
    }
}

/// Wall-clock timing per block of n details plus the full run.
pub struct ExecutionTimeTracker {
    n: usize,
    start: Option<Instant>,
    block_num: usize,
    block_start: Option<Instant>,
    out: Box<dyn Output>,
}

impl ExecutionTimeTracker {
    pub fn new(n: usize, out: Box<dyn Output>) -> Self {
        Self {
            n,
            start: None,
            block_num: 1,
            block_start: None,
            out,
        }
    }
}

impl Listener for ExecutionTimeTracker {
    fn subscribes(&self) -> EventKind {
        EventKind::AfterDetailPlaced
    }
    fn notify(&mut self, event: &Event<'_>) {
        let context = event.context();
        let start = *self.start.get_or_insert_with(Instant::now);
        let block_start = *self.block_start.get_or_insert_with(Instant::now);
        if context.last_placed_index % self.n == 0 {
            self.out.write(&format!(
                "Execution time of block {} of {} details: {} seconds",
                self.block_num,
                self.n,
                block_start.elapsed().as_secs_f64()
            ));
            self.block_num += 1;
            self.block_start = None;
        }
        if context.last_placed_index == context.n0 + context.max_placed - 1 {
            self.out.write(&format!(
                "Full execution time: {} seconds",
                start.elapsed().as_secs_f64()
            ));
        }
    }
}

/// Running maxima of min_side / max_side^gamma over produced normal boxes,
/// reported as maximal increasing runs.
pub struct NormalBoxMaxRatioTracker {
    current_max: f64,
    start: Option<(usize, f64)>,
    finish: (usize, f64),
    out: Box<dyn Output>,
}

impl NormalBoxMaxRatioTracker {
    pub fn new(out: Box<dyn Output>) -> Self {
        Self {
            current_max: f64::NEG_INFINITY,
            start: None,
            finish: (0, 0.0),
            out,
        }
    }
}

impl Listener for NormalBoxMaxRatioTracker {
    fn subscribes(&self) -> EventKind {
        EventKind::AfterDetailPlaced
    }
    fn notify(&mut self, event: &Event<'_>) {
        let Event::AfterDetailPlaced(context, placement) = event else {
            return;
        };
        let min_size = placement.normal_box.min_side();
        let max_size = placement.normal_box.width().max(placement.normal_box.height());
        let value = min_size / max_size.powf(context.gamma);
        if value > self.current_max {
            self.current_max = value;
            self.finish = (context.last_placed_index, value);
            if self.start.is_none() {
                self.start = Some((context.last_placed_index, value));
            }
        } else if let Some((start_index, start_value)) = self.start.take() {
            self.out.write(&format!(
                "{} - {}: {} - {}",
                start_index, self.finish.0, start_value, self.finish.1
            ));
        }
    }
}

/// Only the final maximum of min_side / max_side^gamma, written at the end
/// of the run.
pub struct NormalBoxFinalMaxRatioTracker {
    current_max: f64,
    out: Box<dyn Output>,
}

impl NormalBoxFinalMaxRatioTracker {
    pub fn new(out: Box<dyn Output>) -> Self {
        Self {
            current_max: f64::NEG_INFINITY,
            out,
        }
    }
}

impl Listener for NormalBoxFinalMaxRatioTracker {
    fn subscribes(&self) -> EventKind {
        EventKind::AfterDetailPlaced
    }
    fn notify(&mut self, event: &Event<'_>) {
        let Event::AfterDetailPlaced(context, placement) = event else {
            return;
        };
        let min_size = placement.normal_box.min_side();
        let max_size = placement.normal_box.width().max(placement.normal_box.height());
        let value = min_size / max_size.powf(context.gamma);
        if value > self.current_max {
            self.current_max = value;
        }
        if context.last_placed_index == context.n0 + context.max_placed - 1 {
            self.out.write(&format!(
                "n0 = {}, gamma = {}, max_ratio = {}",
                context.n0, context.gamma, self.current_max
            ));
        }
    }
}

/// Share of the total free area still held by the LRP at each cut.
/// Requires the engine to maintain the placement list.
pub struct LrpOccupancyRatioTracker {
    out: Box<dyn Output>,
}

impl LrpOccupancyRatioTracker {
    pub fn new(out: Box<dyn Output>) -> Self {
        Self { out }
    }
}

impl Listener for LrpOccupancyRatioTracker {
    fn subscribes(&self) -> EventKind {
        EventKind::BeforeLrpCut
    }
    fn notify(&mut self, event: &Event<'_>) {
        let context = event.context();
        let free_area: f64 = context
            .placed
            .iter()
            .filter(|d| d.detail_type != Kind::Detail)
            .map(|d| d.area())
            .sum();
        let ratio = context.lrp.area() / free_area;
        self.out.write(&format!(
            "Placed: {}, lrp: {}",
            context.last_placed_index, ratio
        ));
    }
}

/// The same ratio through the closed form free_area = 1/(n+1), exact for
/// the harmonic streams and independent of the placement list.
pub struct HarmonicLrpOccupancyRatioTracker {
    out: Box<dyn Output>,
}

impl HarmonicLrpOccupancyRatioTracker {
    pub fn new(out: Box<dyn Output>) -> Self {
        Self { out }
    }
}

impl Listener for HarmonicLrpOccupancyRatioTracker {
    fn subscribes(&self) -> EventKind {
        EventKind::BeforeLrpCut
    }
    fn notify(&mut self, event: &Event<'_>) {
        let context = event.context();
        let free_area = 1.0 / (context.last_placed_index + 1) as f64;
        let ratio = context.lrp.area() / free_area;
        self.out.write(&format!(
            "Placed: {}, lrp: {}",
            context.last_placed_index, ratio
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail::Detail;
    use crate::statistic::Context;
    use crate::statistic::Placement;
    use std::sync::Arc;
    use std::sync::Mutex;

    #[derive(Clone)]
    struct Capture(Arc<Mutex<Vec<String>>>);

    impl Capture {
        fn new() -> Self {
            Self(Arc::new(Mutex::new(Vec::new())))
        }
        fn lines(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Output for Capture {
        fn write(&mut self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    fn context<'a>(
        lrp: &'a Detail,
        placed: &'a [Detail],
        last_placed_index: usize,
    ) -> Context<'a> {
        Context {
            gamma: 4.0 / 3.0,
            n0: 10,
            max_placed: 5,
            lrp,
            active_box: None,
            active_box_first_detail_index: 10,
            is_active_box_horizontal: true,
            last_placed_index,
            endpoints_placed: 1,
            active_box_from: Some(Kind::Lrp),
            size: (0.1, 0.1),
            placed,
        }
    }

    #[test]
    fn each_n_fires_on_multiples_only() {
        let sink = Capture::new();
        let mut listener = PrintEachN::new(5, Box::new(sink.clone()));
        let lrp = Detail::new((0.0, 0.0), (1.0, 1.0), "LRP", Kind::Lrp);
        let placed = vec![lrp.clone()];
        for index in 11..=20 {
            let normal = Detail::new((0.0, 0.0), (0.1, 0.2), "B", Kind::NormalBox1);
            let detail = Detail::new((0.0, 0.0), (0.1, 0.1), "D", Kind::Detail);
            let endpoint = Detail::new((0.1, 0.0), (1.0, 0.2), "E", Kind::Endpoint1);
            listener.notify(&Event::AfterDetailPlaced(
                context(&lrp, &placed, index),
                Placement {
                    detail: &detail,
                    normal_box: &normal,
                    endpoint: &endpoint,
                },
            ));
        }
        assert!(
            sink.lines()
                == vec![
                    "Placed detail with index 15".to_string(),
                    "Placed detail with index 20".to_string(),
                ]
        );
    }

    #[test]
    fn occupancy_ratio_excludes_placed_details() {
        let sink = Capture::new();
        let mut listener = LrpOccupancyRatioTracker::new(Box::new(sink.clone()));
        let lrp = Detail::new((0.0, 0.0), (0.5, 1.0), "LRP", Kind::Lrp);
        let placed = vec![
            lrp.clone(),
            Detail::new((0.5, 0.0), (1.0, 0.5), "D10", Kind::Detail),
            Detail::new((0.5, 0.5), (1.0, 1.0), "B10", Kind::NormalBox1),
        ];
        listener.notify(&Event::BeforeLrpCut(context(&lrp, &placed, 10)));
        // lrp area 0.5, free area 0.5 + 0.25
        assert!(sink.lines() == vec![format!("Placed: 10, lrp: {}", 0.5 / 0.75)]);
    }

    #[test]
    fn final_ratio_written_once_at_end() {
        let sink = Capture::new();
        let mut listener = NormalBoxFinalMaxRatioTracker::new(Box::new(sink.clone()));
        let lrp = Detail::new((0.0, 0.0), (1.0, 1.0), "LRP", Kind::Lrp);
        let placed = vec![lrp.clone()];
        for index in [13, 14] {
            let normal = Detail::new((0.0, 0.0), (0.1, 0.2), "B", Kind::NormalBox1);
            let detail = Detail::new((0.0, 0.0), (0.1, 0.1), "D", Kind::Detail);
            let endpoint = Detail::new((0.1, 0.0), (1.0, 0.2), "E", Kind::Endpoint1);
            listener.notify(&Event::AfterDetailPlaced(
                context(&lrp, &placed, index),
                Placement {
                    detail: &detail,
                    normal_box: &normal,
                    endpoint: &endpoint,
                },
            ));
        }
        let lines = sink.lines();
        assert!(lines.len() == 1);
        assert!(lines[0].starts_with("n0 = 10, gamma = "));
    }
}
