//! Trimming of generated airway paths against the caller's endpoints.

use tracing::debug;

use crate::geo::course_deviation_deg;
use crate::waypoint::Waypt;

/// Drop redundant or dog-leg elements at either end of a generated path.
///
/// The last element goes when `to` resolved exactly onto the graph (it would
/// duplicate `to`) or when the leg from it to `to` deviates from the direct
/// `from -> to` course by more than `dog_leg_threshold_deg`. If that empties
/// the path, the empty path is the result: `from` and `to` resolved to the
/// same or adjacent nodes. Otherwise the first element gets the symmetric
/// treatment against `from`.
pub fn clean_generated_path(
    from: &Waypt,
    to: &Waypt,
    path: &mut Vec<Waypt>,
    exact_from: bool,
    exact_to: bool,
    dog_leg_threshold_deg: f64,
) {
    let Some(last) = path.last() else {
        return;
    };

    let enroute_course = from.position().course_deg(&to.position());
    let final_leg_course = last.position().course_deg(&to.position());
    let final_deviation = course_deviation_deg(enroute_course, final_leg_course);
    if exact_to || final_deviation > dog_leg_threshold_deg {
        debug!(
            dropped = %last.ident(),
            exact_to,
            deviation_deg = final_deviation,
            "trimmed path tail"
        );
        path.pop();
    }

    let Some(first) = path.first() else {
        return;
    };

    let initial_leg_course = from.position().course_deg(&first.position());
    let initial_deviation = course_deviation_deg(enroute_course, initial_leg_course);
    if exact_from || initial_deviation > dog_leg_threshold_deg {
        debug!(
            dropped = %first.ident(),
            exact_from,
            deviation_deg = initial_deviation,
            "trimmed path head"
        );
        path.remove(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_DOG_LEG_THRESHOLD_DEG;
    use crate::geo::GeoPos;

    fn point(ident: &str, lat: f64, lon: f64) -> Waypt {
        Waypt::basic(ident, GeoPos::new(lat, lon))
    }

    fn idents(path: &[Waypt]) -> Vec<String> {
        path.iter().map(|w| w.ident().into_owned()).collect()
    }

    fn clean(from: &Waypt, to: &Waypt, path: &mut Vec<Waypt>, exact_from: bool, exact_to: bool) {
        clean_generated_path(from, to, path, exact_from, exact_to, DEFAULT_DOG_LEG_THRESHOLD_DEG);
    }

    #[test]
    fn exact_from_drops_head_and_keeps_approximate_tail() {
        let from = point("X", 0.0, 0.0);
        let to = point("DEST", 0.0, 1.2);
        let mut path = vec![point("X", 0.0, 0.0), point("Y", 0.0, 1.0)];
        clean(&from, &to, &mut path, true, false);
        assert_eq!(idents(&path), ["Y"]);
    }

    #[test]
    fn exact_to_drops_tail() {
        let from = point("ORIG", 0.0, -0.2);
        let to = point("Y", 0.0, 2.0);
        let mut path = vec![point("X", 0.0, 0.0), point("M", 0.0, 1.0), point("Y", 0.0, 2.0)];
        clean(&from, &to, &mut path, false, true);
        assert_eq!(idents(&path), ["X", "M"]);
    }

    #[test]
    fn tail_behind_destination_is_a_dog_leg() {
        let from = point("ORIG", 0.0, 0.0);
        let to = point("DEST", 0.0, 2.0);
        // Last node overshoots the destination, so the final leg points back.
        let mut path = vec![point("A", 0.0, 0.5), point("B", 0.0, 2.5)];
        clean(&from, &to, &mut path, false, false);
        assert_eq!(idents(&path), ["A"]);
    }

    #[test]
    fn head_behind_origin_is_a_dog_leg() {
        let from = point("ORIG", 0.0, 0.0);
        let to = point("DEST", 0.0, 2.0);
        let mut path = vec![point("A", 0.0, -0.5), point("B", 0.0, 1.5)];
        clean(&from, &to, &mut path, false, false);
        assert_eq!(idents(&path), ["B"]);
    }

    #[test]
    fn single_exact_node_leaves_an_empty_path() {
        let from = point("N", 10.0, 10.0);
        let to = point("N", 10.0, 10.0);
        let mut path = vec![point("N", 10.0, 10.0)];
        clean(&from, &to, &mut path, true, true);
        assert!(path.is_empty());
    }

    #[test]
    fn empty_path_is_left_alone() {
        let from = point("A", 0.0, 0.0);
        let to = point("B", 0.0, 1.0);
        let mut path = Vec::new();
        clean(&from, &to, &mut path, true, true);
        assert!(path.is_empty());
    }

    #[test]
    fn threshold_is_configurable() {
        let from = point("ORIG", 0.0, 0.0);
        let to = point("DEST", 0.0, 2.0);
        // Final leg runs roughly south-east, about 60 degrees off the
        // eastbound enroute course.
        let path = vec![point("A", 0.0, 0.5), point("B", 0.5, 1.7)];

        let mut lenient = path.clone();
        clean_generated_path(&from, &to, &mut lenient, false, false, 90.0);
        assert_eq!(idents(&lenient), ["A", "B"]);

        let mut strict = path;
        clean_generated_path(&from, &to, &mut strict, false, false, 45.0);
        assert_eq!(idents(&strict), ["A"]);
    }

    #[test]
    fn kept_end_legs_stay_within_threshold() {
        let from = point("ORIG", 0.0, 0.0);
        let to = point("DEST", 0.0, 3.0);
        let mut path = vec![
            point("A", 0.0, -0.3),
            point("B", 0.2, 1.0),
            point("C", 0.1, 2.0),
            point("D", 0.0, 3.4),
        ];
        clean(&from, &to, &mut path, false, false);

        let enroute = from.position().course_deg(&to.position());
        let head = from.position().course_deg(&path[0].position());
        let tail = path[path.len() - 1].position().course_deg(&to.position());
        assert!(course_deviation_deg(enroute, head) <= DEFAULT_DOG_LEG_THRESHOLD_DEG);
        assert!(course_deviation_deg(enroute, tail) <= DEFAULT_DOG_LEG_THRESHOLD_DEG);
        assert_eq!(idents(&path), ["B", "C"]);
    }
}
