use crate::env::CanonicalStep;

/// Picks the next action from the latest normalized step.
pub trait Policy<A> {
    fn act(&mut self, step: &CanonicalStep) -> A;
}

impl<A, F> Policy<A> for F
where
    F: FnMut(&CanonicalStep) -> A,
{
    fn act(&mut self, step: &CanonicalStep) -> A {
        self(step)
    }
}
