pub mod common;


#[cfg(test)]
mod test_turn_pipeline;


#[cfg(test)]
mod test_condition_damage;
