pub mod random_walk;
