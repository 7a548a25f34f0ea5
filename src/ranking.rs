//! Ranking is derived from the current ratings every time the list is read.
//! Whatever `ranking` a record carried before is discarded.

use std::cmp::Ordering;

use crate::entities::movie;

/// Orders `movies` ascending by rating (unrated first) and assigns rankings
/// `n..=1`, so the highest rated movie ends up with ranking 1.
///
/// The sort is stable: movies with equal ratings keep their input order.
pub fn rank(mut movies: Vec<movie::Model>) -> Vec<movie::Model> {
    movies.sort_by(|a, b| compare_ratings(a.rating, b.rating));

    let total = movies.len();
    for (index, movie) in movies.iter_mut().enumerate() {
        movie.ranking = Some((total - index) as i32);
    }
    movies
}

fn compare_ratings(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.total_cmp(&b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i32, rating: Option<f64>) -> movie::Model {
        movie::Model {
            id,
            title: format!("Movie {id}"),
            year: Some(2000),
            description: String::new(),
            ranking: Some(99),
            rating,
            review: None,
            image_url: String::new(),
        }
    }

    fn ids(movies: &[movie::Model]) -> Vec<i32> {
        movies.iter().map(|m| m.id).collect()
    }

    #[test]
    fn highest_rating_gets_rank_one() {
        let ranked = rank(vec![movie(1, Some(5.0)), movie(2, Some(8.0))]);
        assert_eq!(ids(&ranked), vec![1, 2]);
        assert_eq!(ranked[0].ranking, Some(2));
        assert_eq!(ranked[1].ranking, Some(1));
    }

    #[test]
    fn unrated_movies_sort_first() {
        let ranked = rank(vec![movie(1, Some(3.0)), movie(2, None), movie(3, Some(0.0))]);
        assert_eq!(ids(&ranked), vec![2, 3, 1]);
        assert_eq!(ranked[0].ranking, Some(3));
    }

    #[test]
    fn ties_keep_input_order() {
        let ranked = rank(vec![
            movie(4, Some(7.0)),
            movie(1, Some(7.0)),
            movie(9, None),
            movie(2, None),
        ]);
        assert_eq!(ids(&ranked), vec![9, 2, 4, 1]);
    }

    #[test]
    fn rankings_form_a_permutation() {
        let input = vec![
            movie(1, Some(2.5)),
            movie(2, None),
            movie(3, Some(10.0)),
            movie(4, Some(2.5)),
            movie(5, Some(0.0)),
        ];
        let ranked = rank(input);
        let mut rankings: Vec<i32> = ranked.iter().filter_map(|m| m.ranking).collect();
        rankings.sort_unstable();
        assert_eq!(rankings, vec![1, 2, 3, 4, 5]);
        assert_eq!(ranked.last().map(|m| m.id), Some(3));
    }

    #[test]
    fn stale_ranking_is_overwritten() {
        let ranked = rank(vec![movie(1, Some(1.0))]);
        assert_eq!(ranked[0].ranking, Some(1));
    }

    #[test]
    fn empty_list_is_fine() {
        assert!(rank(Vec::new()).is_empty());
    }
}
