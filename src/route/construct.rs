//! Greedy nearest-neighbor tour construction.

use super::state::RouteState;
use crate::model::DistanceModel;

/// Builds a starting tour by always moving to the closest unvisited city.
///
/// Starts at city 0 and closes back to it. Visited cities are masked out of
/// every subsequent row scan, which has the same effect as overwriting their
/// columns with `+inf` in a working copy of the table. Ties go to the lowest
/// city index, so the result depends only on the model. O(n²).
///
/// # Examples
///
/// ```
/// use u_tsp_anneal::model::{DistanceModel, Point};
/// use u_tsp_anneal::route::nearest_neighbor;
///
/// let model = DistanceModel::new(vec![
///     Point::new(0.0, 0.0),
///     Point::new(10.0, 0.0),
///     Point::new(1.0, 0.0),
/// ])
/// .unwrap();
/// let route = nearest_neighbor(&model);
/// assert_eq!(route.cities(), &[0, 2, 1, 0]);
/// assert_eq!(route.cost(), 20.0);
/// ```
pub fn nearest_neighbor(model: &DistanceModel) -> RouteState {
    let n = model.len();
    let mut cities = Vec::with_capacity(n + 1);
    cities.push(RouteState::ANCHOR);

    let mut visited = vec![false; n];
    visited[RouteState::ANCHOR] = true;

    let mut current = RouteState::ANCHOR;
    let mut cost = 0.0;
    for _ in 1..n {
        let mut next = None;
        let mut nearest = f64::INFINITY;
        for (city, &d) in model.row(current).iter().enumerate() {
            if !visited[city] && (next.is_none() || d < nearest) {
                next = Some(city);
                nearest = d;
            }
        }
        // Every step before the last leaves at least one unvisited city.
        let Some(next) = next else { break };

        visited[next] = true;
        cities.push(next);
        cost += nearest;
        current = next;
    }

    cost += model.edge_cost(current, RouteState::ANCHOR);
    cities.push(RouteState::ANCHOR);
    RouteState::from_parts(cities, cost)
}
