//! Registry of global symbols that ship with the runtime

use rustc_hash::FxHashSet;
use std::sync::LazyLock;

const FUNCTIONS: &[&str] = &[
    "abs", "array_combine", "array_diff", "array_fill", "array_filter", "array_flip",
    "array_is_list", "array_key_exists", "array_key_first", "array_key_last", "array_keys",
    "array_map", "array_merge", "array_pop", "array_push", "array_reduce", "array_reverse",
    "array_search", "array_shift", "array_slice", "array_splice", "array_sum", "array_unique",
    "array_unshift", "array_values", "array_walk", "arsort", "asort", "assert", "base64_decode",
    "base64_encode", "basename", "bin2hex", "call_user_func", "call_user_func_array", "ceil",
    "chr", "class_exists", "compact", "constant", "count", "crc32", "date", "define", "defined",
    "dirname", "enum_exists", "explode", "extract", "file_exists", "file_get_contents",
    "file_put_contents", "floor", "func_get_args", "function_exists", "get_class",
    "get_object_vars", "get_parent_class", "gettype", "hash", "htmlspecialchars", "implode",
    "in_array", "intdiv", "interface_exists", "intval", "is_a", "is_array", "is_bool",
    "is_callable", "is_dir", "is_file", "is_float", "is_int", "is_iterable", "is_null",
    "is_numeric", "is_object", "is_string", "is_subclass_of", "iterator_to_array", "join",
    "json_decode", "json_encode", "krsort", "ksort", "lcfirst", "ltrim", "max", "md5",
    "method_exists", "microtime", "min", "mb_strlen", "mb_strtolower", "mb_strtoupper",
    "mb_substr", "number_format", "ord", "preg_match", "preg_match_all", "preg_quote",
    "preg_replace", "preg_replace_callback", "preg_split", "print_r", "printf",
    "property_exists", "random_int", "range", "realpath", "round", "rsort", "rtrim",
    "serialize", "sha1", "sort", "spl_autoload_register", "spl_object_hash", "spl_object_id",
    "sprintf", "sqrt", "str_contains", "str_ends_with", "str_pad", "str_repeat", "str_replace",
    "str_split", "str_starts_with", "strcmp", "strlen", "strpos", "strrpos", "strtolower",
    "strtoupper", "strval", "substr", "time", "trait_exists", "trigger_error", "trim",
    "uasort", "ucfirst", "ucwords", "uksort", "uniqid", "unserialize", "usleep", "usort",
    "var_dump", "var_export", "vsprintf",
];

const CLASSES: &[&str] = &[
    "ArgumentCountError", "ArithmeticError", "ArrayAccess", "ArrayIterator", "ArrayObject",
    "AssertionError", "BackedEnum", "BadFunctionCallException", "BadMethodCallException",
    "Closure", "Countable", "DateInterval", "DateTime", "DateTimeImmutable",
    "DateTimeInterface", "DateTimeZone", "DivisionByZeroError", "DomainException", "Error",
    "ErrorException", "Exception", "Fiber", "Generator", "InvalidArgumentException",
    "Iterator", "IteratorAggregate", "JsonException", "JsonSerializable", "LengthException",
    "LogicException", "OutOfBoundsException", "OutOfRangeException", "OverflowException",
    "RangeException", "ReflectionClass", "ReflectionFunction", "ReflectionMethod",
    "RuntimeException", "SplObjectStorage", "SplStack", "Stringable", "Throwable",
    "Traversable", "TypeError", "UnderflowException", "UnexpectedValueException", "UnitEnum",
    "ValueError", "WeakMap", "WeakReference", "stdClass",
];

const CONSTANTS: &[&str] = &[
    "ARRAY_FILTER_USE_BOTH", "ARRAY_FILTER_USE_KEY", "COUNT_RECURSIVE", "DIRECTORY_SEPARATOR",
    "E_ALL", "E_DEPRECATED", "E_ERROR", "E_NOTICE", "E_STRICT", "E_USER_DEPRECATED",
    "E_USER_ERROR", "E_USER_NOTICE", "E_USER_WARNING", "E_WARNING", "JSON_ERROR_NONE",
    "JSON_PRETTY_PRINT", "JSON_THROW_ON_ERROR", "JSON_UNESCAPED_SLASHES",
    "JSON_UNESCAPED_UNICODE", "M_PI", "PATH_SEPARATOR", "PHP_EOL", "PHP_FLOAT_EPSILON",
    "PHP_INT_MAX", "PHP_INT_MIN", "PHP_INT_SIZE", "PHP_OS", "PHP_OS_FAMILY", "PHP_VERSION",
    "PREG_SPLIT_NO_EMPTY", "SORT_NUMERIC", "SORT_REGULAR", "SORT_STRING",
];

static FUNCTION_SET: LazyLock<FxHashSet<String>> =
    LazyLock::new(|| FUNCTIONS.iter().map(|name| name.to_ascii_lowercase()).collect());

static CLASS_SET: LazyLock<FxHashSet<String>> =
    LazyLock::new(|| CLASSES.iter().map(|name| name.to_ascii_lowercase()).collect());

static CONSTANT_SET: LazyLock<FxHashSet<&'static str>> =
    LazyLock::new(|| CONSTANTS.iter().copied().collect());

/// Whether `name` is a global function of the runtime (case-insensitive)
pub fn is_builtin_function(name: &str) -> bool {
    FUNCTION_SET.contains(&name.to_ascii_lowercase())
}

/// Whether `name` is a global class or interface of the runtime (case-insensitive)
pub fn is_builtin_class(name: &str) -> bool {
    CLASS_SET.contains(&name.to_ascii_lowercase())
}

/// Whether `name` is a global constant of the runtime
pub fn is_builtin_constant(name: &str) -> bool {
    CONSTANT_SET.contains(name)
}
