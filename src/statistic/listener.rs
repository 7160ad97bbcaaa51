use crate::statistic::Event;
use crate::statistic::EventKind;

/// A statistic listener subscribed to exactly one event kind.
///
/// Listeners observe the engine, they never steer it: mutating the
/// placement list or engine state from a listener is out of contract.
pub trait Listener: Send {
    /// the single event kind this listener wants delivered
    fn subscribes(&self) -> EventKind;
    fn notify(&mut self, event: &Event<'_>);
}

/// Deliver an event to every subscribed listener, synchronously, in
/// registration order.
pub fn notify_all(listeners: &mut [Box<dyn Listener>], event: &Event<'_>) {
    for listener in listeners.iter_mut() {
        if listener.subscribes() == event.kind() {
            listener.notify(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail::Detail;
    use crate::detail::Kind;
    use crate::statistic::Context;
    use std::sync::Arc;
    use std::sync::Mutex;

    struct Tagger {
        kind: EventKind,
        tag: &'static str,
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Listener for Tagger {
        fn subscribes(&self) -> EventKind {
            self.kind
        }
        fn notify(&mut self, _: &Event<'_>) {
            self.seen.lock().unwrap().push(self.tag);
        }
    }

    fn end_event<'a>(lrp: &'a Detail, placed: &'a [Detail]) -> Event<'a> {
        Event::End(Context {
            gamma: 4.0 / 3.0,
            n0: 1,
            max_placed: 1,
            lrp,
            active_box: None,
            active_box_first_detail_index: 1,
            is_active_box_horizontal: false,
            last_placed_index: 1,
            endpoints_placed: 1,
            active_box_from: None,
            size: (1.0, 1.0),
            placed,
        })
    }

    #[test]
    fn dispatch_filters_by_kind_and_keeps_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut listeners: Vec<Box<dyn Listener>> = vec![
            Box::new(Tagger {
                kind: EventKind::End,
                tag: "first",
                seen: seen.clone(),
            }),
            Box::new(Tagger {
                kind: EventKind::BeforeLrpCut,
                tag: "wrong-kind",
                seen: seen.clone(),
            }),
            Box::new(Tagger {
                kind: EventKind::End,
                tag: "second",
                seen: seen.clone(),
            }),
        ];
        let lrp = Detail::new((0.0, 0.0), (1.0, 1.0), "LRP", Kind::Lrp);
        let placed = vec![lrp.clone()];
        notify_all(&mut listeners, &end_event(&lrp, &placed));
        assert!(*seen.lock().unwrap() == vec!["first", "second"]);
    }
}
