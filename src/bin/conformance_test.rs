use lispy::{evaluator, parser, reader};

fn main() {
    println!("=== Lispy Conformance Test ===\n");

    let env = evaluator::create_global_env();

    let mut total_tests = 0;
    let mut failed_tests = 0;

    // Cases run in order against one session; later cases may use earlier definitions
    let test_cases = vec![
        // Literals
        ("42", "42", "Number literal"),
        ("-7", "-7", "Negative number literal"),
        ("\"hi\\n\"", "\"hi\\n\"", "String literal keeps escapes when printed"),
        ("{1 2 3}", "{1 2 3}", "Q-expression is self-evaluating"),
        ("()", "()", "Empty S-expression"),
        ("99999999999999999999", "Error: invalid number", "Overflowing literal"),
        // Arithmetic
        ("+ 1 2 3", "6", "Addition folds left to right"),
        ("(- 10 3 2)", "5", "Subtraction"),
        ("(- 5)", "5", "Single operand seeds the fold"),
        ("(* 2 3 4)", "24", "Multiplication"),
        ("(/ 7 2)", "3", "Division truncates"),
        ("(/ 5 0)", "Error: division by zero", "Division by zero"),
        // Lists
        ("(list 1 2 3)", "{1 2 3}", "list"),
        ("(head {1 2 3})", "{1}", "head"),
        ("(tail {1 2 3})", "{2 3}", "tail"),
        ("(join {1 2} {3})", "{1 2 3}", "join"),
        ("(eval {+ 1 2})", "3", "eval retags a Q-expression"),
        ("(head {})", "Error: Function 'head' passed {}", "head of empty list"),
        // Comparison and equality
        ("(> 2 1)", "1", "Greater than true"),
        ("(<= 2 1)", "0", "Less or equal false"),
        ("(== {1 2} {1 2})", "1", "Structural equality"),
        ("(== 1 \"1\")", "0", "Mismatched types are unequal"),
        ("(!= 1 2)", "1", "Inequality"),
        // Conditionals
        ("(if 1 {1} {2})", "1", "If then branch"),
        ("(if 0 {1} {2})", "2", "If else branch"),
        ("(if 1 {1} {def {leak} 1})", "1", "Untaken branch is not evaluated"),
        ("leak", "Error: unbound symbol leak", "No binding from untaken branch"),
        // Definitions and functions
        ("def {x} 5", "()", "Global definition"),
        ("x", "5", "Lookup after definition"),
        ("def {add} (\\ {a b} {+ a b})", "()", "Define a lambda"),
        ("add", "(\\ {a b} {+ a b})", "Closure printing"),
        ("add 1 2", "3", "Full application"),
        ("(add 1)", "(\\ {b} {+ a b})", "Partial application"),
        ("def {inc} (add 1)", "()", "Store a curried function"),
        ("inc 41", "42", "Apply a curried function"),
        ("add 1 2 3", "Error: too many arguments: got 3, expected 2", "Too many arguments"),
        ("(1 2)", "Error: first element is not a function", "Non-function head"),
        ("(error \"boom\")", "Error: boom", "User error"),
    ];

    println!("--- Core behavior ---");
    for (input, expected, description) in test_cases {
        total_tests += 1;
        let actual = match parser::parse(input) {
            Ok(tree) => evaluator::eval(&env, reader::read(&tree)).to_string(),
            Err(e) => format!("Error: {}", e),
        };

        if actual == expected {
            println!("✓ {}: {} => {}", description, input, actual);
        } else {
            failed_tests += 1;
            println!("✗ {}: {}", description, input);
            println!("    expected: {}", expected);
            println!("    actual:   {}", actual);
        }
    }

    println!();
    println!("=== Summary ===");
    println!("Total: {}", total_tests);
    println!("Passed: {}", total_tests - failed_tests);
    println!("Failed: {}", failed_tests);

    if failed_tests > 0 {
        std::process::exit(1);
    }
}
