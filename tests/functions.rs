mod common;

use common::*;

#[test]
fn test_function_application() {
    let cases = [
        ("let identity = fn(x) { x; }; identity(5);", 5),
        ("let identity = fn(x) { return x; }; identity(5);", 5),
        ("let double = fn(x) { x * 2; }; double(5);", 10),
        ("let add = fn(x, y) { x + y; }; add(5, 5);", 10),
        ("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));", 20),
        ("fn(x) { x; }(5)", 5),
    ];
    for (input, expected) in cases {
        assert_integer(&run(input), expected);
    }
}

#[test]
fn test_closures_capture_their_definition_environment() {
    assert_integer(
        &run("let adder = fn(x) { fn(y) { x + y } }; let addTwo = adder(2); addTwo(2);"),
        4,
    );
    assert_integer(&run("let adder = fn(x) { fn(y) { x + y } }; adder(2)(2);"), 4);
}

#[test]
fn test_closure_sees_later_mutation_of_captured_binding() {
    assert_integer(
        &run("let x = 1; let get = fn() { x }; x = 10; get();"),
        10,
    );
}

#[test]
fn test_higher_order_functions() {
    assert_integer(
        &run("let apply = fn(f, v) { f(v) }; apply(fn(v) { v + 1 }, 5);"),
        6,
    );
}

#[test]
fn test_recursion() {
    assert_integer(
        &run("let fact = fn(n) { if (n < 2) { return 1; } n * fact(n - 1); }; fact(5);"),
        120,
    );
}

#[test]
fn test_builtins_are_first_class() {
    assert_integer(&run("let f = len; f([1, 2, 3]);"), 3);
}

#[test]
fn test_function_arity_mismatch() {
    let message = run_err("let f = fn(x) { x }; f(1, 2);");
    assert_eq!(message, "wrong number of arguments. got=2, want=1");
}

#[test]
fn test_calling_a_non_function() {
    assert_eq!(run_err("5(1)"), "not a function: INTEGER");
}

#[test]
fn test_array_builtins() {
    assert_integer(&run("len([1, 2, 3])"), 3);
    assert_integer(&run("first([7, 8])"), 7);
    assert_integer(&run("last([7, 8])"), 8);
    assert_null(&run("first([])"));
    assert_null(&run("last([])"));
    assert_null(&run("rest([])"));
    assert_integer(&run("len(rest([1, 2, 3]))"), 2);
    assert_integer(&run("first(rest([1, 2, 3]))"), 2);
    assert_integer(&run("len(push([1, 2], 3))"), 3);
    assert_integer(&run("last(push([1, 2], 3))"), 3);
    assert_integer(&run("len(pop([1, 2, 3]))"), 2);
    assert_integer(&run("count([1, 2, 3])"), 3);
    assert_integer(&run("count([])"), 0);
    assert_integer(&run("sum([1, 2, 3, 4])"), 10);
    assert_integer(&run("sum([])"), 0);
    assert_integer(&run("avg([1, 2, 3, 4])"), 2);
    assert_integer(&run("avg([3, 4])"), 3);
}

#[test]
fn test_push_does_not_mutate_the_original() {
    assert_integer(&run("let a = [1, 2]; push(a, 3); len(a);"), 2);
}

#[test]
fn test_push_2d_row_arity_checked() {
    let message = run_err("push([[1, 2]], [3])");
    assert_eq!(
        message,
        "cannot push array of length 1 to 2D array with row length 2"
    );
    let message = run_err("push([[1, 2]], 3)");
    assert_eq!(message, "cannot push non-array value to 2D array");
    assert_integer(&run("len(push([[1, 2]], [3, 4]))"), 2);
}
