//! Visiting order for detected nodes: nearest-neighbour open tour, then 2-opt.

use crate::domain::model::Position;

/// Length of the open path `start -> route[0] -> route[1] -> ...`.
pub fn route_length(start: Position, route: &[Position]) -> u32 {
    let mut total = 0;
    let mut current = start;
    for stop in route {
        total += current.manhattan(stop);
        current = *stop;
    }
    total
}

fn nearest_neighbour(start: Position, targets: &[Position]) -> Vec<Position> {
    let mut remaining: Vec<Position> = targets.to_vec();
    let mut route = Vec::with_capacity(remaining.len());
    let mut current = start;

    // 距離相同時取座標較小者，保持結果穩定
    while let Some(index) = remaining
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| (current.manhattan(p), **p))
        .map(|(index, _)| index)
    {
        current = remaining.swap_remove(index);
        route.push(current);
    }
    route
}

/// Reverses segments while that shortens the path. The start is fixed and the
/// tour is open, so the last stop has no return edge.
fn two_opt(start: Position, route: &mut [Position]) {
    let n = route.len();
    if n < 2 {
        return;
    }

    let mut improved = true;
    while improved {
        improved = false;
        for i in 0..n - 1 {
            for j in i + 1..n {
                let before = if i == 0 { start } else { route[i - 1] };
                let old = before.manhattan(&route[i])
                    + if j + 1 < n { route[j].manhattan(&route[j + 1]) } else { 0 };
                let new = before.manhattan(&route[j])
                    + if j + 1 < n { route[i].manhattan(&route[j + 1]) } else { 0 };
                if new < old {
                    route[i..=j].reverse();
                    improved = true;
                }
            }
        }
    }
}

/// Every target exactly once, duplicates collapsed.
pub fn plan_route(start: Position, targets: &[Position]) -> Vec<Position> {
    let mut unique = targets.to_vec();
    unique.sort();
    unique.dedup();

    let mut route = nearest_neighbour(start, &unique);
    two_opt(start, &mut route);
    route
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_empty_and_single() {
        assert!(plan_route(p(0, 0), &[]).is_empty());
        assert_eq!(plan_route(p(0, 0), &[p(3, 3)]), vec![p(3, 3)]);
    }

    #[test]
    fn test_visits_every_target_once() {
        let targets = vec![p(5, 5), p(1, 0), p(9, 2), p(3, 7), p(1, 0), p(0, 9)];
        let route = plan_route(p(0, 0), &targets);
        assert_eq!(route.len(), 5);

        let mut sorted = route.clone();
        sorted.sort();
        let mut expected = targets.clone();
        expected.sort();
        expected.dedup();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_line_is_walked_in_order() {
        let route = plan_route(p(0, 0), &[p(4, 0), p(2, 0), p(6, 0), p(1, 0)]);
        assert_eq!(route, vec![p(1, 0), p(2, 0), p(4, 0), p(6, 0)]);
        assert_eq!(route_length(p(0, 0), &route), 6);
    }

    #[test]
    fn test_two_opt_never_lengthens_greedy_tour() {
        let start = p(10, 10);
        let targets = vec![p(0, 0), p(20, 0), p(11, 10), p(9, 10), p(20, 20), p(0, 20), p(10, 0)];
        let greedy = nearest_neighbour(start, &targets);
        let planned = plan_route(start, &targets);
        assert!(route_length(start, &planned) <= route_length(start, &greedy));
    }

    #[test]
    fn test_two_opt_untangles_crossing() {
        let start = p(0, 0);
        let mut route = vec![p(5, 5), p(1, 1), p(2, 2), p(6, 6)];
        let before = route_length(start, &route);
        two_opt(start, &mut route);
        assert!(route_length(start, &route) < before);
        assert_eq!(route_length(start, &route), 12);
    }
}
