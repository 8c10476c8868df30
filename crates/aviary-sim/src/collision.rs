//! Agent-versus-world collision tests

use glam::IVec2;

use crate::agent::Agent;
use crate::mask::SpriteSet;
use crate::obstacle::Obstacle;

/// Pixel-accurate collision queries over a shared sprite set
#[derive(Debug, Clone, Copy)]
pub struct CollisionIndex<'a> {
    sprites: &'a SpriteSet,
}

impl<'a> CollisionIndex<'a> {
    pub fn new(sprites: &'a SpriteSet) -> Self {
        Self { sprites }
    }

    /// True if the agent's current frame overlaps either piece of the obstacle
    pub fn overlaps(&self, agent: &Agent, obstacle: &Obstacle) -> bool {
        let bird = self.sprites.bird(agent.frame());
        let agent_x = agent.x().round() as i32;
        let agent_y = agent.y.round() as i32;
        let dx = obstacle.x.round() as i32 - agent_x;

        let top_y = obstacle.top_piece_y(self.sprites.pipe_height()).round() as i32;
        let bottom_y = obstacle.gap_bottom().round() as i32;

        bird.overlap(self.sprites.pipe_top(), IVec2::new(dx, top_y - agent_y))
            .is_some()
            || bird
                .overlap(self.sprites.pipe_bottom(), IVec2::new(dx, bottom_y - agent_y))
                .is_some()
    }

    /// True if the agent touched the floor (with forgiveness margin) or left
    /// through the top of the field
    pub fn out_of_bounds(&self, agent: &Agent, floor_y: f32, floor_margin: f32) -> bool {
        agent.y + self.sprites.bird_height() as f32 - floor_margin >= floor_y || agent.y < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprites() -> SpriteSet {
        SpriteSet::procedural()
    }

    #[test]
    fn test_agent_inside_gap_does_not_collide() {
        let sprites = sprites();
        let index = CollisionIndex::new(&sprites);
        // Gap spans 200..400, bird is 48 tall
        let obstacle = Obstacle::new(200.0, 300.0, 200.0);
        let agent = Agent::new(230.0, 276.0);
        assert!(!index.overlaps(&agent, &obstacle));
    }

    #[test]
    fn test_agent_in_top_piece_collides() {
        let sprites = sprites();
        let index = CollisionIndex::new(&sprites);
        let obstacle = Obstacle::new(200.0, 300.0, 200.0);
        let agent = Agent::new(230.0, 150.0);
        assert!(index.overlaps(&agent, &obstacle));
    }

    #[test]
    fn test_agent_in_bottom_piece_collides() {
        let sprites = sprites();
        let index = CollisionIndex::new(&sprites);
        let obstacle = Obstacle::new(200.0, 300.0, 200.0);
        let agent = Agent::new(230.0, 380.0);
        assert!(index.overlaps(&agent, &obstacle));
    }

    #[test]
    fn test_far_obstacle_does_not_collide() {
        let sprites = sprites();
        let index = CollisionIndex::new(&sprites);
        let obstacle = Obstacle::new(500.0, 300.0, 200.0);
        let agent = Agent::new(230.0, 0.0);
        assert!(!index.overlaps(&agent, &obstacle));
    }

    #[test]
    fn test_transparent_rows_do_not_collide() {
        let sprites = sprites();
        let index = CollisionIndex::new(&sprites);
        let agent = Agent::new(230.0, 246.0);

        // The bottom rows of the bird sprite are transparent: a lip starting
        // there is inside the bounding box but misses every solid pixel
        let grazing = Obstacle::new(230.0, agent.y + 44.0 - 100.0, 200.0);
        assert_eq!(grazing.gap_bottom(), agent.y + 44.0);
        assert!(!index.overlaps(&agent, &grazing));

        let hitting = Obstacle::new(230.0, agent.y + 40.0 - 100.0, 200.0);
        assert!(index.overlaps(&agent, &hitting));
    }

    #[test]
    fn test_collision_invariant_under_vertical_translation() {
        let sprites = sprites();
        let index = CollisionIndex::new(&sprites);

        for agent_y in (100..600).step_by(7) {
            for center in (150..550).step_by(23) {
                let agent = Agent::new(230.0, agent_y as f32);
                let obstacle = Obstacle::new(210.0, center as f32, 200.0);
                let verdict = index.overlaps(&agent, &obstacle);

                for shift in [-90.0, -13.0, 1.0, 40.0, 250.0] {
                    let moved_agent = Agent::new(230.0, agent_y as f32 + shift);
                    let moved_obstacle = Obstacle::new(210.0, center as f32 + shift, 200.0);
                    assert_eq!(index.overlaps(&moved_agent, &moved_obstacle), verdict);
                }
            }
        }
    }

    #[test]
    fn test_out_of_bounds_floor_with_margin() {
        let sprites = sprites();
        let index = CollisionIndex::new(&sprites);
        // 665 + 48 - 10 == 703
        assert!(index.out_of_bounds(&Agent::new(230.0, 665.0), 703.0, 10.0));
        assert!(!index.out_of_bounds(&Agent::new(230.0, 664.0), 703.0, 10.0));
    }

    #[test]
    fn test_out_of_bounds_above_field() {
        let sprites = sprites();
        let index = CollisionIndex::new(&sprites);
        assert!(index.out_of_bounds(&Agent::new(230.0, -0.5), 703.0, 10.0));
        assert!(!index.out_of_bounds(&Agent::new(230.0, 0.0), 703.0, 10.0));
    }
}
