use ::rand::Rng;

use crate::error::Result;
use crate::mutation;
use crate::web::Web;

/// Produce one generation: `children_count` mutated clones of `parent`,
/// followed by the parent itself, advanced one generation and rescored.
///
/// With dynamic flies the prey is resampled before cloning, so the parent and
/// every child are judged against the same fresh population.
pub fn reproduce(parent: &Web, rng: &mut impl Rng) -> Result<Vec<Web>> {
    let mut parent = parent.clone();
    if parent.config().dynamic_flies {
        parent.regenerate_flies(rng);
    }

    let children_count = parent.config().children_count;
    let mut offspring = Vec::with_capacity(children_count + 1);
    for _ in 0..children_count {
        let mut child = parent.clone();
        mutation::mutate(&mut child, rng)?;
        offspring.push(child);
    }

    parent.generation += 1;
    parent.last_mutation = None;
    parent.calculate_efficiency();
    offspring.push(parent);
    Ok(offspring)
}

/// Best web under the configured ordering. On a full tie the later candidate
/// wins, which keeps the parent when no child improved on it.
pub fn select_best(webs: Vec<Web>) -> Option<Web> {
    webs.into_iter().max_by(|a, b| a.cmp_fitness(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WebConfig;
    use ::rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::cmp::Ordering;

    fn config() -> WebConfig {
        WebConfig::builder()
            .sides_count(10)
            .flies_count(50)
            .build()
            .unwrap()
    }

    #[test]
    fn reproduce_returns_children_plus_parent_one_generation_later() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let parent = Web::create(config(), &mut rng).unwrap();
        let generation = parent.generation();

        let offspring = reproduce(&parent, &mut rng).unwrap();

        assert_eq!(offspring.len(), config().children_count + 1);
        for web in &offspring {
            assert_eq!(web.generation(), generation + 1);
            web.check_invariants().unwrap();
        }
        let survivor = offspring.last().unwrap();
        assert_eq!(survivor.last_mutation(), None);
        assert_eq!(survivor.skeleton().points(), parent.skeleton().points());
        assert_eq!(survivor.fitness(), parent.fitness());
        assert!(offspring[..3].iter().all(|w| w.last_mutation().is_some()));
    }

    #[test]
    fn children_count_follows_config() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let config = WebConfig::builder()
            .sides_count(10)
            .flies_count(50)
            .children_count(7)
            .build()
            .unwrap();
        let parent = Web::create(config, &mut rng).unwrap();
        assert_eq!(reproduce(&parent, &mut rng).unwrap().len(), 8);
    }

    #[test]
    fn dynamic_flies_are_shared_by_the_whole_generation() {
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let config = WebConfig::builder()
            .sides_count(10)
            .flies_count(50)
            .dynamic_flies(true)
            .build()
            .unwrap();
        let parent = Web::create(config, &mut rng).unwrap();
        let offspring = reproduce(&parent, &mut rng).unwrap();

        let fresh = offspring[0].flies();
        assert_ne!(fresh, parent.flies());
        assert!(offspring.iter().all(|w| w.flies() == fresh));
    }

    #[test]
    fn select_best_picks_the_maximum() {
        let mut rng = ChaCha8Rng::seed_from_u64(15);
        let parent = Web::create(config(), &mut rng).unwrap();
        let offspring = reproduce(&parent, &mut rng).unwrap();
        let best = select_best(offspring.clone()).unwrap();
        for web in &offspring {
            assert_ne!(best.cmp_fitness(web), Ordering::Less);
        }
        assert!(select_best(Vec::new()).is_none());
    }

    #[test]
    fn full_tie_keeps_the_parent() {
        let mut rng = ChaCha8Rng::seed_from_u64(16);
        let parent = Web::create(config(), &mut rng).unwrap();
        let mut twin = parent.clone();
        twin.last_mutation = Some(crate::mutation::MutationKind::RemoveRing);
        let best = select_best(vec![twin, parent]).unwrap();
        assert_eq!(best.last_mutation(), None);
    }
}
