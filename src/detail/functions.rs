use crate::algorithm::PackError;
use crate::detail::Detail;
use crate::detail::Kind;
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;

/// All rectangles sharing at least a boundary point with the target,
/// the target included.
pub fn all_neighbours<'a>(details: &'a [Detail], target: &Detail) -> Vec<&'a Detail> {
    details.iter().filter(|d| target.touches(d)).collect()
}

/// The neighbour relation closed to the given depth. Depth 0 is the target
/// alone, depth 1 adds its immediate neighbours, and so on. Identity is by
/// name, which is unique among live placements.
pub fn neighbours_of_depth<'a>(
    details: &'a [Detail],
    target: &'a Detail,
    depth: usize,
) -> Vec<&'a Detail> {
    let mut selected: Vec<&Detail> = vec![target];
    let mut names: HashSet<&str> = HashSet::from([target.name.as_str()]);
    for _ in 0..depth {
        for current in selected.clone() {
            for neighbour in all_neighbours(details, current) {
                if names.insert(neighbour.name.as_str()) {
                    selected.push(neighbour);
                }
            }
        }
    }
    selected
}

/// Histogram of detail types in the given list.
pub fn count_kinds(details: &[Detail]) -> HashMap<Kind, usize> {
    let mut counts = HashMap::new();
    for detail in details {
        *counts.entry(detail.detail_type).or_insert(0) += 1;
    }
    counts
}

/// Write the placement list as a JSON array of rectangle objects.
pub fn save_json(details: &[Detail], path: impl AsRef<Path>) -> Result<(), PackError> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, details)?;
    Ok(())
}

/// Read a placement list back from its JSON form.
pub fn load_json(path: impl AsRef<Path>) -> Result<Vec<Detail>, PackError> {
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}
