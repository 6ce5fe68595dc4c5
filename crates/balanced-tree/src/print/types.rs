/// Renders one child subtree given the indentation prefix for its lines.
pub type PrintChild<'a> = dyn Fn(&str) -> String + 'a;
