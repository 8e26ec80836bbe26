pub mod amber_genome;
