use super::*;

#[test]
fn test_names_are_sequential() {
    let mut pool = TempVarPool::new();
    assert_eq!(pool.get_temp_var_name(), "$t0");
    assert_eq!(pool.get_temp_var_name(), "$t1");
    assert!(pool.in_use("$t0"));
}

#[test]
fn test_released_names_are_reused() {
    let mut pool = TempVarPool::new();
    let a = pool.get_temp_var_name();
    let _b = pool.get_temp_var_name();
    pool.remove_temp_var(&a);
    assert!(!pool.in_use(&a));
    assert_eq!(pool.get_temp_var_name(), "$t0");
    assert_eq!(pool.get_temp_var_name(), "$t2");
    assert_eq!(pool.declared_names(), vec!["$t0", "$t1", "$t2"]);
}

#[test]
fn test_nested_pool_avoids_enclosing_names() {
    let mut outer = TempVarPool::new();
    outer.get_temp_var_name();
    outer.get_temp_var_name();
    let mut inner = outer.nested();
    assert!(inner.is_empty());
    assert_eq!(inner.get_temp_var_name(), "$t2");
}

#[test]
fn test_removing_unknown_name_is_ignored() {
    let mut pool = TempVarPool::new();
    pool.remove_temp_var("$t9");
    assert!(pool.is_empty());
}
