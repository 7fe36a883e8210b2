mod rb_tree;
pub(crate) use rb_tree::RbTree;
