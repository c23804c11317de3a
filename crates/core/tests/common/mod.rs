//! Shared fixture: a small Go module with two packages and one vendored
//! dependency, covering interfaces, embedding, promotion, pointer and value
//! receivers, grouped declarations, and doc-comment placement.

use std::fs;
use std::path::Path;

pub fn write_fixture(root: &Path) {
    fs::write(root.join("go.mod"), "module example.com/demo\n\ngo 1.22\n").expect("write go.mod");

    let greeter_dir = root.join("greeter");
    fs::create_dir_all(&greeter_dir).expect("mkdir greeter");
    fs::write(greeter_dir.join("greeter.go"), GREETER_GO).expect("write greeter.go");

    let shapes_dir = root.join("shapes");
    fs::create_dir_all(&shapes_dir).expect("mkdir shapes");
    fs::write(shapes_dir.join("shapes.go"), SHAPES_GO).expect("write shapes.go");

    let vendor_dir = root.join("vendor/github.com/acme/syncx");
    fs::create_dir_all(&vendor_dir).expect("mkdir vendor");
    fs::write(vendor_dir.join("syncx.go"), SYNCX_GO).expect("write syncx.go");
}

pub const GREETER_PKG: &str = "example.com/demo/greeter";
pub const SHAPES_PKG: &str = "example.com/demo/shapes";

const GREETER_GO: &str = r#"// Package greeter holds greeting implementations.
package greeter

import "github.com/acme/syncx"

// Greeter is the interface for producing greetings.
type Greeter interface {
	// Greet returns a greeting string for the given name.
	Greet(name string) string
}

// English greets in English using a configurable prefix.
type English struct {
	// Prefix is prepended to the name.
	Prefix string
}

// Greet returns a greeting.
func (e *English) Greet(name string) string {
	return e.Prefix + name
}

// Formal greets with a formal salutation.
type Formal struct{}

// Greet returns a formal greeting.
func (f Formal) Greet(name string) string {
	return "Dear " + name
}

// DefaultPrefix is the default greeting prefix.
const DefaultPrefix = "Hello, "

// MaxLength is the maximum allowed greeting length.
var MaxLength = 100

// New returns an English greeter with the given prefix.
func New(prefix string) *English {
	return &English{Prefix: prefix}
}

// NoReturn does something with no return value.
func NoReturn(s string) {}

// SingleNamed returns a named result.
func SingleNamed(s string) (result string) { return s }

// MultiUnnamed returns multiple unnamed results.
func MultiUnnamed(s string) (string, error) { return s, nil }

// MultiNamed returns multiple named results.
func MultiNamed(s string) (out string, err error) { return s, nil }

// Variadic joins strings with a separator.
func Variadic(sep string, parts ...string) string { return "" }

// BlankReceiver exercises blank-receiver signature formatting.
func (_ *English) BlankReceiver() {}

// Lockable guards a value with an embedded mutex.
type Lockable struct {
	syncx.Mutex
}

// FormalEnglish embeds Formal and greets formally.
type FormalEnglish struct {
	Formal
}

// Tone is a named scalar with its own behavior.
type Tone int

// Level reports the tone level.
func (t Tone) Level() int { return int(t) }

// Salutation is an alias kept for backwards compatibility.
type Salutation = Formal

// Pair carries two labeled values.
type Pair struct {
	Left string `json:"left"` // left-hand label
	// Right holds the right-hand label.
	Right string
}

var (
	// Verbose enables chatty output.
	Verbose = false
	Quiet   = true
)

func hidden() {}

type secret struct{}

var internalCount = 2
"#;

const SHAPES_GO: &str = r#"// Package shapes exercises cross-package interface satisfaction.
package shapes

// Loud greets by shouting.
type Loud struct{}

// Greet returns an upper-case greeting.
func (l Loud) Greet(name string) string { return "HEY " + name }

// Walker can take steps.
type Walker interface {
	Walk(steps int) error
}

// Runner extends Walker with a faster gait.
type Runner interface {
	Walker
	Run(speed float64) error
}

// Robot implements Runner with pointer receivers.
type Robot struct{}

func (r *Robot) Walk(steps int) error { return nil }

func (r *Robot) Run(speed float64) error { return nil }
"#;

const SYNCX_GO: &str = r#"// Package syncx provides minimal locking primitives.
package syncx

// Mutex is a mutual exclusion lock.
type Mutex struct{}

// Lock acquires the lock.
func (m *Mutex) Lock() {}

// Unlock releases the lock.
func (m *Mutex) Unlock() {}
"#;
