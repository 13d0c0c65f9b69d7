use pg_role_labeler::Role;
use proptest::prelude::*;

/// Strategy for probe answers, weighted towards known roles
pub fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![
        3 => Just(Role::Primary),
        3 => Just(Role::Replica),
        2 => Just(Role::Unknown),
    ]
}

/// Strategy for iterations: the probe answer and whether a label write made
/// during that iteration would succeed
pub fn iteration_strategy() -> impl Strategy<Value = (Role, bool)> {
    (role_strategy(), prop::bool::weighted(0.7))
}

/// Strategy for runs of iterations
pub fn iterations_strategy() -> impl Strategy<Value = Vec<(Role, bool)>> {
    prop::collection::vec(iteration_strategy(), 0..40)
}
