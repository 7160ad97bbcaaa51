use crate::algorithm::SlackPack;
use crate::algorithm::LRP_NAME;
use crate::detail::Detail;
use crate::detail::DetailGenerator;
use crate::detail::Kind;
use crate::storage::BoxStorage;

/// The empty sheet at the origin, sized from the generator's base size.
pub fn base_sheet(generator: &impl DetailGenerator) -> Detail {
    let (width, height) = generator.base_size();
    Detail::new((0.0, 0.0), (width, height), LRP_NAME, Kind::Lrp)
}

/// Pulls sizes from the generator and feeds the engine until the quota is
/// reached or placement fails. A failure is reported and swallowed; the
/// placements accumulated so far are always returned.
pub struct DetailPlacer<'a, G, S> {
    generator: G,
    engine: &'a mut SlackPack<S>,
    sheet: Detail,
    max_placed: usize,
}

impl<'a, G, S> DetailPlacer<'a, G, S>
where
    G: DetailGenerator,
    S: BoxStorage,
{
    pub fn new(
        generator: G,
        engine: &'a mut SlackPack<S>,
        sheet: Detail,
        max_placed: usize,
    ) -> Self {
        Self {
            generator,
            engine,
            sheet,
            max_placed,
        }
    }

    pub async fn run(mut self) -> Vec<Detail> {
        let mut placed = vec![self.sheet];
        for _ in 0..self.max_placed {
            let Some(size) = self.generator.next() else {
                break;
            };
            if let Err(e) = self.engine.place_next(size, &mut placed).await {
                log::error!("an error occurred during placement: {}", e);
                break;
            }
        }
        placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail::HarmonicSquares;
    use crate::storage::InMemoryBoxStorage;

    #[tokio::test]
    async fn zero_quota_returns_the_sheet_alone() {
        let generator = HarmonicSquares::new(10).unwrap();
        let sheet = base_sheet(&generator);
        let mut engine = SlackPack::new(4.0 / 3.0, 10, 0, InMemoryBoxStorage::new()).unwrap();
        let placed = DetailPlacer::new(generator, &mut engine, sheet.clone(), 0)
            .run()
            .await;
        assert!(placed == vec![sheet]);
    }

    #[tokio::test]
    async fn quota_of_one_cuts_once_and_places_once() {
        let generator = HarmonicSquares::new(10).unwrap();
        let sheet = base_sheet(&generator);
        let mut engine = SlackPack::new(4.0 / 3.0, 10, 1, InMemoryBoxStorage::new()).unwrap();
        let placed = DetailPlacer::new(generator, &mut engine, sheet, 1).run().await;
        assert!(placed.len() == 4);
        assert!(placed.iter().filter(|d| d.detail_type == Kind::Detail).count() == 1);
        assert!(placed.iter().filter(|d| d.detail_type == Kind::Lrp).count() == 1);
    }

    #[tokio::test]
    async fn fatal_placement_failure_returns_partial_results() {
        // the 1x1 first detail of n0 = 1 can never fit with its unit gap
        let generator = HarmonicSquares::new(1).unwrap();
        let sheet = base_sheet(&generator);
        let mut engine = SlackPack::new(4.0 / 3.0, 1, 5, InMemoryBoxStorage::new()).unwrap();
        let placed = DetailPlacer::new(generator, &mut engine, sheet.clone(), 5)
            .run()
            .await;
        assert!(placed == vec![sheet]);
    }

    #[tokio::test]
    async fn runs_the_full_quota() {
        let generator = HarmonicSquares::new(100).unwrap();
        let sheet = base_sheet(&generator);
        let mut engine = SlackPack::new(4.0 / 3.0, 100, 100, InMemoryBoxStorage::new()).unwrap();
        let placed = DetailPlacer::new(generator, &mut engine, sheet, 100).run().await;
        assert!(placed.iter().filter(|d| d.detail_type == Kind::Detail).count() == 100);
        assert!(engine.last_placed_index() == 199);
    }
}
