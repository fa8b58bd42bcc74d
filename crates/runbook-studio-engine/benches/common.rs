// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_runbook(functions: usize) -> String {
    let mut content = String::from("<#\n  Generated benchmark runbook\n#>\n");
    for index in 0..functions {
        content.push_str(&format!(
            "workflow Step-{index}\n{{\n    [CmdletBinding()]\n    param(\n        [Parameter(Mandatory = $true)]\n        [string] $name{index},\n        [int[]] $ports = @(80, 443)\n    )\n\n    # Pipeline over the ports\n    $ports | ForEach-Object {{\n        Write-Output \"$name{index}:$_\"\n    }}\n}}\n\n"
        ));
    }
    content
}

#[allow(dead_code)]
pub fn generate_lines(count: usize) -> String {
    (0..count)
        .map(|line| format!("Write-Output 'line {line}'\n"))
        .collect()
}
